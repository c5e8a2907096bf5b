//! Route definitions for the probe web endpoints.

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::web::{handlers, state::AppState};

/// Status and reset routes
pub fn status_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::status::current_status))
        .route("/reset", get(handlers::status::reset_table))
}

/// Liveness routes for monitoring and container probes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::health_check))
}
