//! Health log handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use shared::{Action, PaginatedResponse, Pagination, Resource};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ai_health_analysis::AnalyzeHealthRequest;
use crate::middleware::{check_permission, AuthUser};
use crate::models::HealthObservation;
use crate::services::health_log::{CreateHealthLogInput, HealthLogFilter};
use crate::services::{HealthLogService, PlantLotService};
use crate::AppState;

fn health_log_service(state: &AppState) -> HealthLogService {
    HealthLogService::new(
        state.db.clone(),
        state.config.storage.public_base_url.clone(),
    )
}

pub async fn list_health_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<HealthLogFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<HealthObservation>>> {
    check_permission(&user, Resource::HealthLog, Action::View)?;
    let logs = health_log_service(&state)
        .list_health_logs(user.zone_scope()?, &filter, &pagination)
        .await?;
    Ok(Json(logs))
}

pub async fn get_health_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(log_id): Path<Uuid>,
) -> AppResult<Json<HealthObservation>> {
    check_permission(&user, Resource::HealthLog, Action::View)?;
    let log = health_log_service(&state)
        .get_health_log(log_id, user.zone_scope()?)
        .await?;
    Ok(Json(log))
}

pub async fn create_health_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateHealthLogInput>,
) -> AppResult<(StatusCode, Json<HealthObservation>)> {
    check_permission(&user, Resource::HealthLog, Action::Create)?;

    let lot = PlantLotService::new(state.db.clone())
        .get_lot(input.plant_lot_id)
        .await?;
    user.ensure_zone(lot.zone_id)?;
    if lot.is_closed() {
        return Err(AppError::conflict(
            "plant_lot",
            "Cannot record health logs for a closed lot",
        ));
    }

    let log = health_log_service(&state)
        .create_health_log(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// Run the AI image analysis for a health log and store the result
pub async fn analyze_health_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(log_id): Path<Uuid>,
) -> AppResult<Json<HealthObservation>> {
    check_permission(&user, Resource::HealthLog, Action::Edit)?;

    let client = state
        .ai_client
        .as_ref()
        .ok_or_else(|| AppError::ExternalService("AI analysis is not configured".to_string()))?;

    let service = health_log_service(&state);
    let log = service.get_health_log(log_id, user.zone_scope()?).await?;

    if log.images.is_empty() {
        return Err(AppError::validation(
            "images",
            "Health log has no images to analyse",
        ));
    }

    let analysis = client
        .analyze(&AnalyzeHealthRequest {
            health_log_id: log.id,
            plant_lot_id: log.plant_lot_id,
            image_urls: log.images.clone(),
        })
        .await?;

    Ok(Json(service.apply_ai_analysis(log.id, &analysis).await?))
}
