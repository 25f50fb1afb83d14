//! Plant lot handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use shared::qr::lot_qr_url;
use shared::{Action, PaginatedResponse, Pagination, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, AuthUser};
use crate::models::{HealthObservation, PlantLot};
use crate::services::plant_lot::{CreatePlantLotInput, LotFilter, UpdatePlantLotInput};
use crate::services::{HealthLogService, PlantLotService};
use crate::AppState;

/// Label content for a lot
#[derive(Serialize)]
pub struct LotQrCode {
    pub lot_number: String,
    pub url: String,
}

pub async fn list_lots(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<LotFilter>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<PlantLot>>> {
    check_permission(&user, Resource::PlantLot, Action::View)?;
    let service = PlantLotService::new(state.db.clone());
    let lots = service
        .list_lots(user.zone_scope()?, &filter, &pagination)
        .await?;
    Ok(Json(lots))
}

pub async fn get_lot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<PlantLot>> {
    check_permission(&user, Resource::PlantLot, Action::View)?;
    let service = PlantLotService::new(state.db.clone());
    let lot = service.get_lot(lot_id).await?;
    user.ensure_zone(lot.zone_id)?;
    Ok(Json(lot))
}

pub async fn create_lot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreatePlantLotInput>,
) -> AppResult<(StatusCode, Json<PlantLot>)> {
    check_permission(&user, Resource::PlantLot, Action::Create)?;
    user.ensure_zone(input.zone_id)?;
    let service = PlantLotService::new(state.db.clone());
    let lot = service.create_lot(input).await?;
    Ok((StatusCode::CREATED, Json(lot)))
}

pub async fn update_lot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lot_id): Path<Uuid>,
    Json(input): Json<UpdatePlantLotInput>,
) -> AppResult<Json<PlantLot>> {
    check_permission(&user, Resource::PlantLot, Action::Edit)?;
    let service = PlantLotService::new(state.db.clone());

    let existing = service.get_lot(lot_id).await?;
    user.ensure_zone(existing.zone_id)?;
    if let Some(zone_id) = input.zone_id {
        user.ensure_zone(zone_id)?;
    }

    Ok(Json(service.update_lot(lot_id, input).await?))
}

pub async fn delete_lot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lot_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    check_permission(&user, Resource::PlantLot, Action::Delete)?;
    let service = PlantLotService::new(state.db.clone());
    service.delete_lot(lot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Full health history of a lot, oldest first
pub async fn list_lot_health_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<Vec<HealthObservation>>> {
    check_permission(&user, Resource::HealthLog, Action::View)?;
    let lot = PlantLotService::new(state.db.clone()).get_lot(lot_id).await?;
    user.ensure_zone(lot.zone_id)?;

    let service = HealthLogService::new(
        state.db.clone(),
        state.config.storage.public_base_url.clone(),
    );
    Ok(Json(service.list_by_lot(lot.id).await?))
}

/// QR label content for a lot
pub async fn get_lot_qr_code(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<LotQrCode>> {
    check_permission(&user, Resource::PlantLot, Action::View)?;
    let lot = PlantLotService::new(state.db.clone()).get_lot(lot_id).await?;
    user.ensure_zone(lot.zone_id)?;

    let url = lot_qr_url(&state.config.storage.public_base_url, &lot.lot_number);
    Ok(Json(LotQrCode {
        lot_number: lot.lot_number,
        url,
    }))
}
