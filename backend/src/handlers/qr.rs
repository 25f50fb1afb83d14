//! QR label lookup

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use shared::qr::parse_qr_payload;
use shared::{Action, Resource};

use crate::error::{AppError, AppResult};
use crate::middleware::{check_permission, AuthUser};
use crate::services::plant_lot::LotLookup;
use crate::services::PlantLotService;
use crate::AppState;

/// Resolve a scanned QR payload to its lot, zone and latest health log
pub async fn resolve_qr_code(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(payload): Path<String>,
) -> AppResult<Json<LotLookup>> {
    check_permission(&user, Resource::PlantLot, Action::View)?;

    let lot_number = parse_qr_payload(&payload)
        .ok_or_else(|| AppError::validation("payload", "QR code does not contain a lot number"))?;

    let lookup = PlantLotService::new(state.db.clone())
        .lookup_by_lot_number(&lot_number)
        .await?;
    user.ensure_zone(lookup.lot.zone_id)?;

    tracing::debug!(lot_number = %lot_number, "QR code resolved");
    Ok(Json(lookup))
}
