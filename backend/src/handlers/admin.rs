//! Admin maintenance handlers

use axum::{extract::State, Extension, Json};
use shared::{Action, Resource};

use crate::error::AppResult;
use crate::middleware::{check_permission, AuthUser};
use crate::services::image::ImageMigrationReport;
use crate::services::ImageService;
use crate::AppState;

/// Rewrite stored relative image paths to absolute URLs
pub async fn migrate_image_urls(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ImageMigrationReport>> {
    check_permission(&user, Resource::Image, Action::Migrate)?;

    let service = ImageService::new(
        state.db.clone(),
        state.config.storage.public_base_url.clone(),
    );
    let report = service.migrate_relative_urls().await?;

    tracing::info!(
        user_id = %user.user_id,
        rows_updated = report.rows_updated,
        "image URL migration requested"
    );
    Ok(Json(report))
}
