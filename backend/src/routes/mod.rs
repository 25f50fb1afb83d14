//! Route definitions for the Plantation Management System

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .nest("/users", user_routes())
        .nest("/zones", zone_routes())
        .nest("/species", species_routes())
        .nest("/lots", lot_routes())
        .nest("/health-logs", health_log_routes())
        .route("/qr/:payload", get(handlers::resolve_qr_code))
        .nest("/analytics", analytics_routes())
        .route("/admin/images/migrate", post(handlers::migrate_image_urls))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .merge(protected)
}

/// User administration routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:user_id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::deactivate_user),
        )
}

/// Zone management routes
fn zone_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_zones).post(handlers::create_zone))
        .route(
            "/:zone_id",
            get(handlers::get_zone)
                .put(handlers::update_zone)
                .delete(handlers::delete_zone),
        )
}

/// Species catalogue routes
fn species_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_species).post(handlers::create_species))
        .route(
            "/:species_id",
            get(handlers::get_species)
                .put(handlers::update_species)
                .delete(handlers::delete_species),
        )
}

/// Plant lot routes
fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lots).post(handlers::create_lot))
        .route(
            "/:lot_id",
            get(handlers::get_lot)
                .put(handlers::update_lot)
                .delete(handlers::delete_lot),
        )
        .route("/:lot_id/health-logs", get(handlers::list_lot_health_logs))
        .route("/:lot_id/qr", get(handlers::get_lot_qr_code))
}

/// Health log routes
fn health_log_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_health_logs).post(handlers::create_health_log),
        )
        .route("/:log_id", get(handlers::get_health_log))
        .route("/:log_id/analyze", post(handlers::analyze_health_log))
}

/// Reporting routes
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/readiness", get(handlers::get_readiness_report))
        .route("/lots/:lot_id/trends", get(handlers::get_lot_trends))
        .route("/dashboard", get(handlers::get_dashboard))
}
