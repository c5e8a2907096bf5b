//! One-shot probe run synchronously at process start, before the periodic
//! scheduler is launched.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::constants::PROBE_TABLE;
use crate::database::{ProbeStore, ReadTarget, StoreTarget};
use crate::models::{ReceiptClock, StatusRecord, WriteReceipt};

/// What the startup probe saw and did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    /// Primary status before the write; `None` for an empty table or a failed read
    pub initial_status: Option<StatusRecord>,
    pub read_error: Option<String>,
    pub receipt: Option<WriteReceipt>,
    pub write_error: Option<String>,
}

impl StartupReport {
    pub fn succeeded(&self) -> bool {
        self.read_error.is_none() && self.write_error.is_none()
    }
}

pub struct StartupProbe {
    store: Arc<dyn ProbeStore>,
    clock: Arc<ReceiptClock>,
}

impl StartupProbe {
    pub fn new(store: Arc<dyn ProbeStore>, clock: Arc<ReceiptClock>) -> Self {
        Self { store, clock }
    }

    /// Read the primary's current status, then write one timestamp. Failures
    /// are logged and recorded, never returned.
    pub async fn run_once(&self) -> StartupReport {
        let (initial_status, read_error) = match self.store.read_status(ReadTarget::Primary).await {
            Ok(Some(status)) => {
                info!(target_db = %ReadTarget::Primary, "{}", status);
                (Some(status), None)
            }
            Ok(None) => {
                info!(target_db = %ReadTarget::Primary, "empty database");
                (None, None)
            }
            Err(e) => {
                error!(
                    target_db = StoreTarget::PrimaryRead.label(),
                    error = %e,
                    "Error accessing DB during startup read"
                );
                (None, Some(e.to_string()))
            }
        };

        let (receipt, write_error) = match self.store.write_timestamp(self.clock.now()).await {
            Ok(receipt) => {
                info!(
                    written_at = %receipt.written_at,
                    "Wrote \"{}\" to table \"{}\"",
                    receipt.written_at,
                    PROBE_TABLE
                );
                (Some(receipt), None)
            }
            Err(e) => {
                error!(
                    target_db = StoreTarget::PrimaryWrite.label(),
                    error = %e,
                    "Error accessing DB during startup write"
                );
                (None, Some(e.to_string()))
            }
        };

        let report = StartupReport {
            initial_status,
            read_error,
            receipt,
            write_error,
        };
        if !report.succeeded() {
            warn!("Startup probe completed with errors; continuing startup");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::InMemoryProbeStore;

    fn probe_with(store: Arc<InMemoryProbeStore>) -> StartupProbe {
        StartupProbe::new(store, Arc::new(ReceiptClock::new()))
    }

    #[tokio::test]
    async fn test_empty_database_then_write() {
        let store = Arc::new(InMemoryProbeStore::new());
        let report = probe_with(store.clone()).run_once().await;

        assert!(report.succeeded());
        assert!(report.initial_status.is_none());
        assert!(report.receipt.is_some());
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.read_count(ReadTarget::Primary), 1);
        assert_eq!(store.read_count(ReadTarget::Replica), 0);
    }

    #[tokio::test]
    async fn test_reads_existing_status_before_writing() {
        let store = Arc::new(InMemoryProbeStore::new());
        let probe = probe_with(store.clone());
        let first = probe.run_once().await.receipt.unwrap();

        let second = probe.run_once().await;
        let status = second.initial_status.unwrap();
        assert_eq!(status.last_write_ts, first.written_at);
        assert_eq!(status.total_writes, 1);
        assert_eq!(store.row_count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_primary_does_not_abort() {
        let store = Arc::new(InMemoryProbeStore::new());
        store.fail_writes(true);
        store.fail_reads(ReadTarget::Primary, true);

        let report = probe_with(store).run_once().await;
        assert!(!report.succeeded());
        assert!(report.read_error.is_some());
        assert!(report.write_error.is_some());
        assert!(report.receipt.is_none());
    }

    #[tokio::test]
    async fn test_read_failure_still_writes() {
        let store = Arc::new(InMemoryProbeStore::new());
        store.fail_reads(ReadTarget::Primary, true);

        let report = probe_with(store.clone()).run_once().await;
        assert!(report.read_error.is_some());
        assert!(report.receipt.is_some());
        assert_eq!(store.write_count(), 1);
    }
}
