//! Read-your-write comparison between a write receipt and an observed status.

use chrono::TimeDelta;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::Result;
use crate::models::{StatusRecord, WriteReceipt};

/// Result of comparing one receipt against one target's observed status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyOutcome {
    /// Observed timestamp equals the written one
    Consistent,
    /// Observed timestamp differs; `receipt - observed`
    Drifted(TimeDelta),
    /// Target returned no rows at all
    EmptyResponse,
    /// The read (or write) itself failed
    AccessError(String),
}

/// Log severity an outcome is reported at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSeverity {
    Info,
    Warning,
    Error,
}

/// Compare a receipt with an observed status.
///
/// Equality is exact: within one cycle the primary should return the very
/// value just committed, and any difference on the replica is observable lag.
pub fn evaluate(receipt: &WriteReceipt, status: Option<&StatusRecord>) -> ConsistencyOutcome {
    match status {
        None => ConsistencyOutcome::EmptyResponse,
        Some(status) => {
            let delta = receipt.written_at - status.last_write_ts;
            if delta.is_zero() {
                ConsistencyOutcome::Consistent
            } else {
                ConsistencyOutcome::Drifted(delta)
            }
        }
    }
}

impl ConsistencyOutcome {
    /// Fold a read result into an outcome
    pub fn from_read(receipt: &WriteReceipt, read: &Result<Option<StatusRecord>>) -> Self {
        match read {
            Ok(status) => evaluate(receipt, status.as_ref()),
            Err(e) => ConsistencyOutcome::AccessError(e.to_string()),
        }
    }

    pub fn severity(&self) -> OutcomeSeverity {
        match self {
            ConsistencyOutcome::Consistent => OutcomeSeverity::Info,
            ConsistencyOutcome::Drifted(_) | ConsistencyOutcome::EmptyResponse => {
                OutcomeSeverity::Warning
            }
            ConsistencyOutcome::AccessError(_) => OutcomeSeverity::Error,
        }
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self, ConsistencyOutcome::Consistent)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConsistencyOutcome::Consistent => "consistent",
            ConsistencyOutcome::Drifted(_) => "drifted",
            ConsistencyOutcome::EmptyResponse => "empty_response",
            ConsistencyOutcome::AccessError(_) => "access_error",
        }
    }

    pub fn delta(&self) -> Option<TimeDelta> {
        match self {
            ConsistencyOutcome::Drifted(delta) => Some(*delta),
            _ => None,
        }
    }
}

impl fmt::Display for ConsistencyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyOutcome::Consistent => write!(f, "consistent"),
            ConsistencyOutcome::Drifted(delta) => write!(f, "drifted by {delta}"),
            ConsistencyOutcome::EmptyResponse => write!(f, "empty response"),
            ConsistencyOutcome::AccessError(cause) => write!(f, "access error: {cause}"),
        }
    }
}

impl Serialize for ConsistencyOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ConsistencyOutcome", 3)?;
        state.serialize_field("outcome", self.kind())?;
        state.serialize_field("delta_us", &self.delta().and_then(|d| d.num_microseconds()))?;
        let error = match self {
            ConsistencyOutcome::AccessError(cause) => Some(cause.as_str()),
            _ => None,
        };
        state.serialize_field("error", &error)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn ts(micros: i64) -> DateTime<Utc> {
        Utc.timestamp_micros(micros).unwrap()
    }

    fn status_at(at: DateTime<Utc>) -> StatusRecord {
        StatusRecord::new(at, 3, "10.0.0.1")
    }

    #[test]
    fn test_equal_timestamps_are_consistent() {
        let at = ts(1_700_000_000_000_000);
        let outcome = evaluate(&WriteReceipt::new(at), Some(&status_at(at)));
        assert_eq!(outcome, ConsistencyOutcome::Consistent);
        assert_eq!(outcome.severity(), OutcomeSeverity::Info);
    }

    #[test]
    fn test_stale_replica_drift_is_positive() {
        let written = ts(1_700_000_005_000_000);
        let observed = ts(1_700_000_000_000_000);
        let outcome = evaluate(&WriteReceipt::new(written), Some(&status_at(observed)));
        assert_eq!(outcome, ConsistencyOutcome::Drifted(TimeDelta::seconds(5)));
        assert_eq!(outcome.severity(), OutcomeSeverity::Warning);
    }

    #[test]
    fn test_newer_observation_drift_is_negative() {
        let written = ts(1_700_000_000_000_000);
        let observed = ts(1_700_000_000_000_001);
        let outcome = evaluate(&WriteReceipt::new(written), Some(&status_at(observed)));
        assert_eq!(outcome, ConsistencyOutcome::Drifted(TimeDelta::microseconds(-1)));
    }

    #[test]
    fn test_missing_status_is_empty_response() {
        let outcome = evaluate(&WriteReceipt::new(ts(0)), None);
        assert_eq!(outcome, ConsistencyOutcome::EmptyResponse);
        assert_eq!(outcome.severity(), OutcomeSeverity::Warning);
    }

    #[test]
    fn test_read_error_becomes_access_error() {
        let read = Err(ProbeError::connection("replica-read", "connection refused"));
        let outcome = ConsistencyOutcome::from_read(&WriteReceipt::new(ts(0)), &read);
        assert!(matches!(outcome, ConsistencyOutcome::AccessError(ref m) if m.contains("connection refused")));
        assert_eq!(outcome.severity(), OutcomeSeverity::Error);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ConsistencyOutcome::Drifted(TimeDelta::milliseconds(-3))).unwrap();
        assert_eq!(json["outcome"], "drifted");
        assert_eq!(json["delta_us"], -3000);
        assert!(json["error"].is_null());

        let json = serde_json::to_value(ConsistencyOutcome::Consistent).unwrap();
        assert_eq!(json["outcome"], "consistent");
        assert!(json["delta_us"].is_null());
    }

    proptest! {
        #[test]
        fn prop_same_timestamp_always_consistent(micros in 0i64..4_102_444_800_000_000) {
            let at = ts(micros);
            prop_assert_eq!(
                evaluate(&WriteReceipt::new(at), Some(&status_at(at))),
                ConsistencyOutcome::Consistent
            );
        }

        #[test]
        fn prop_different_timestamps_drift_by_difference(
            a in 0i64..4_102_444_800_000_000,
            b in 0i64..4_102_444_800_000_000,
        ) {
            prop_assume!(a != b);
            let outcome = evaluate(&WriteReceipt::new(ts(a)), Some(&status_at(ts(b))));
            prop_assert_eq!(outcome, ConsistencyOutcome::Drifted(TimeDelta::microseconds(a - b)));
        }

        #[test]
        fn prop_no_status_always_empty(micros in 0i64..4_102_444_800_000_000) {
            prop_assert_eq!(
                evaluate(&WriteReceipt::new(ts(micros)), None),
                ConsistencyOutcome::EmptyResponse
            );
        }
    }
}
