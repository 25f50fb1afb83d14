//! Analytics handlers: readiness planning, health trends and the dashboard

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use shared::analytics::{DashboardSummary, HealthTrendReport};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{check_permission, AuthUser};
use crate::services::{AnalyticsService, PlantLotService};
use crate::AppState;

#[derive(Deserialize)]
pub struct ReadinessQuery {
    pub target_date: Option<NaiveDate>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Deserialize)]
pub struct TrendQuery {
    pub as_of: Option<DateTime<Utc>>,
    pub window_days: Option<u32>,
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub horizon_days: Option<u32>,
}

fn analytics_service(state: &AppState) -> AnalyticsService {
    AnalyticsService::new(
        state.db.clone(),
        state.config.storage.public_base_url.clone(),
    )
}

/// Lots deliverable by the target date, grouped by species
pub async fn get_readiness_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ReadinessQuery>,
) -> AppResult<impl IntoResponse> {
    check_permission(&user, Resource::Report, Action::View)?;

    let target_date = query
        .target_date
        .ok_or_else(|| AppError::validation("target_date", "Target date is required"))?;

    let report = analytics_service(&state)
        .readiness(target_date, user.zone_scope()?)
        .await?;

    if query.format.as_deref() == Some("csv") {
        check_permission(&user, Resource::Report, Action::Export)?;
        let rows = AnalyticsService::readiness_rows(&report);
        let csv = AnalyticsService::export_to_csv(&rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"harvest_readiness.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(report).into_response())
    }
}

/// Health trend summary for a single lot
pub async fn get_lot_trends(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(lot_id): Path<Uuid>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<HealthTrendReport>> {
    check_permission(&user, Resource::Report, Action::View)?;

    let lot = PlantLotService::new(state.db.clone()).get_lot(lot_id).await?;
    user.ensure_zone(lot.zone_id)?;

    let as_of = query.as_of.unwrap_or_else(Utc::now);
    let window_days = query
        .window_days
        .unwrap_or(state.config.analytics.default_window_days);

    let report = analytics_service(&state)
        .lot_trends(lot.id, as_of, window_days)
        .await?;
    Ok(Json(report))
}

/// Dashboard counters
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardSummary>> {
    check_permission(&user, Resource::Report, Action::View)?;

    let horizon_days = query
        .horizon_days
        .unwrap_or(state.config.analytics.dashboard_horizon_days);
    shared::validate_dashboard_horizon(horizon_days)?;
    let today = Utc::now().date_naive();

    let summary = analytics_service(&state)
        .dashboard(today, horizon_days, user.zone_scope()?)
        .await?;
    Ok(Json(summary))
}
