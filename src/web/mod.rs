//! # Web API Module
//!
//! Small HTTP surface over the probe: current primary/replica status with the
//! scheduler's last cycle, a table reset, and a liveness endpoint.

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

pub mod errors;
pub mod handlers;
pub mod response_types;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout()));

    let app = Router::new()
        .merge(routes::status_routes())
        .merge(routes::health_routes())
        .layer(common_middleware)
        .with_state(state);

    info!("Web application created with all routes and middleware");
    app
}
