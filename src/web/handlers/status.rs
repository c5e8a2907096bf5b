//! # Status Handlers
//!
//! On-demand reads of both targets and the administrative table reset.

use axum::extract::State;
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::database::ReadTarget;
use crate::web::errors::ApiError;
use crate::web::response_types::{StatusResponse, TargetStatus};
use crate::web::state::AppState;

/// Current status of both targets: GET /
///
/// Each read is bounded by the store's operation timeout, so an unreachable
/// replica shows up as an `error` entry rather than a hung request.
pub async fn current_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (primary, replica) = tokio::join!(
        state.store.read_status(ReadTarget::Primary),
        state.store.read_status(ReadTarget::Replica),
    );

    Json(StatusResponse {
        primary: TargetStatus::from_read(ReadTarget::Primary, primary),
        replica: TargetStatus::from_read(ReadTarget::Replica, replica),
        last_cycle: state.scheduler.last_report(),
    })
}

/// Truncate the probe table on the primary: GET /reset
pub async fn reset_table(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match state.store.reset_all().await {
        Ok(()) => {
            info!("Probe table reset via web request");
            Ok(Json(Value::Array(Vec::new())))
        }
        Err(e) => {
            error!(error = %e, "Error accessing DB: reset failed");
            Err(e.into())
        }
    }
}
