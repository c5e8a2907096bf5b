//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use crate::web::response_types::HealthResponse;
use crate::web::state::AppState;

/// Liveness with scheduler progress: GET /health
///
/// Answers from in-memory state only; never touches the database.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.scheduler.snapshot();
    let last = snapshot.last_report.as_ref();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        scheduler: snapshot.lifecycle,
        interval_seconds: snapshot.interval_seconds,
        cycles_completed: snapshot.cycles_completed,
        last_cycle_at: last.map(|r| r.completed_at),
        last_cycle_consistent: last.map(|r| r.is_consistent()),
    })
}
