//! # Web API Response Types
//!
//! Response bodies for the status and health endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::ReadTarget;
use crate::error::Result;
use crate::models::{format_status, StatusRecord};
use crate::probe::{CycleReport, SchedulerLifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Ok,
    Empty,
    Error,
}

/// One target's status as read on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStatus {
    pub target: ReadTarget,
    pub state: TargetState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<StatusRecord>,
    /// Human-readable status line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetStatus {
    pub fn from_read(target: ReadTarget, read: Result<Option<StatusRecord>>) -> Self {
        match read {
            Ok(Some(record)) => Self {
                target,
                state: TargetState::Ok,
                message: Some(format_status(&record)),
                record: Some(record),
                error: None,
            },
            Ok(None) => Self {
                target,
                state: TargetState::Empty,
                record: None,
                message: Some("empty database".to_string()),
                error: None,
            },
            Err(e) => Self {
                target,
                state: TargetState::Error,
                record: None,
                message: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Body of `GET /`
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub primary: TargetStatus,
    pub replica: TargetStatus,
    pub last_cycle: Option<CycleReport>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub scheduler: SchedulerLifecycle,
    pub interval_seconds: Option<f64>,
    pub cycles_completed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_cycle_consistent: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use chrono::TimeZone;

    #[test]
    fn test_ok_status_carries_formatted_message() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let record = StatusRecord::new(ts, 3, "10.0.0.1");
        let status = TargetStatus::from_read(ReadTarget::Primary, Ok(Some(record.clone())));

        assert_eq!(status.state, TargetState::Ok);
        assert_eq!(status.message, Some(format_status(&record)));
        assert!(status.error.is_none());
    }

    #[test]
    fn test_error_status_omits_record_in_json() {
        let status = TargetStatus::from_read(
            ReadTarget::Replica,
            Err(ProbeError::connection("replica-read", "refused")),
        );
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["state"], "error");
        assert_eq!(json["target"], "replica");
        assert!(json.get("record").is_none());
        assert!(json["error"].as_str().unwrap().contains("refused"));
    }
}
