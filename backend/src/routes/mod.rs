//! Route definitions for the snack tracking server

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Weekly tracking records
        .nest("/tracking", tracking_routes())
        // Aggregates and guidance
        .nest("/statistics", statistics_routes())
}

/// Tracking routes
fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tracking).post(handlers::record_tracking))
        .route("/all", delete(handlers::clear_tracking))
        .route("/comparison", get(handlers::get_week_comparison))
        .route("/current-week", get(handlers::get_current_week))
        .route("/deliveries", post(handlers::record_delivery))
        .route("/snacks/:snack_id/current", get(handlers::get_snack_current))
        .route("/snacks/:snack_id/latest", get(handlers::get_snack_latest))
        .route(
            "/:record_id",
            get(handlers::get_tracking_record).put(handlers::update_tracking_record),
        )
}

/// Statistics routes
fn statistics_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_statistics))
        .route("/recommendations", get(handlers::get_recommendations))
}
