//! Zone handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{check_permission, AuthUser};
use crate::models::Zone;
use crate::services::zone::{CreateZoneInput, UpdateZoneInput};
use crate::services::ZoneService;
use crate::AppState;

pub async fn list_zones(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Zone>>> {
    check_permission(&user, Resource::Zone, Action::View)?;
    let service = ZoneService::new(state.db.clone());
    Ok(Json(service.list_zones().await?))
}

pub async fn get_zone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Json<Zone>> {
    check_permission(&user, Resource::Zone, Action::View)?;
    let service = ZoneService::new(state.db.clone());
    Ok(Json(service.get_zone(zone_id).await?))
}

pub async fn create_zone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateZoneInput>,
) -> AppResult<(StatusCode, Json<Zone>)> {
    check_permission(&user, Resource::Zone, Action::Create)?;
    let service = ZoneService::new(state.db.clone());
    Ok((StatusCode::CREATED, Json(service.create_zone(input).await?)))
}

pub async fn update_zone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(zone_id): Path<Uuid>,
    Json(input): Json<UpdateZoneInput>,
) -> AppResult<Json<Zone>> {
    check_permission(&user, Resource::Zone, Action::Edit)?;
    let service = ZoneService::new(state.db.clone());
    Ok(Json(service.update_zone(zone_id, input).await?))
}

pub async fn delete_zone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    check_permission(&user, Resource::Zone, Action::Delete)?;
    let service = ZoneService::new(state.db.clone());
    service.delete_zone(zone_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
