use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Most recent probe row as observed from one read target
///
/// Built fresh on every read. An empty table is represented by `None` at the
/// call site, never by a zero-valued record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StatusRecord {
    /// Maximum `write_ts` over all rows at the time of the read
    pub last_write_ts: DateTime<Utc>,
    /// Row count at the time of the read (`COUNT(*)`, never negative)
    pub total_writes: i64,
    /// Address of the server that answered the read
    pub server_address: String,
}

impl StatusRecord {
    pub fn new(
        last_write_ts: DateTime<Utc>,
        total_writes: i64,
        server_address: impl Into<String>,
    ) -> Self {
        Self {
            last_write_ts,
            total_writes,
            server_address: server_address.into(),
        }
    }
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Latest timestamp: {} from server {} ({} entries in DB)",
            self.last_write_ts, self.server_address, self.total_writes
        )
    }
}

/// Human-readable one-line rendering used in logs and on the status page
pub fn format_status(status: &StatusRecord) -> String {
    status.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> StatusRecord {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        StatusRecord::new(ts, 42, "10.0.0.7")
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status(&sample()),
            "Latest timestamp: 2024-03-01 12:30:45 UTC from server 10.0.0.7 (42 entries in DB)"
        );
    }

    #[test]
    fn test_format_is_deterministic() {
        let status = sample();
        assert_eq!(format_status(&status), format_status(&status.clone()));
    }
}
