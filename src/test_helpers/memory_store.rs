//! In-memory [`ProbeStore`] with a primary table, a replica view and
//! injectable failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::database::{ProbeStore, ReadTarget, StoreTarget};
use crate::error::{ProbeError, Result};
use crate::models::{StatusRecord, WriteReceipt};

pub const PRIMARY_ADDRESS: &str = "10.0.0.1";
pub const REPLICA_ADDRESS: &str = "10.0.0.2";

#[derive(Debug, Default)]
struct Tables {
    primary: Vec<DateTime<Utc>>,
    /// Frozen replica contents; `None` means the replica mirrors the primary
    replica_snapshot: Option<Vec<DateTime<Utc>>>,
}

#[derive(Debug, Default)]
pub struct InMemoryProbeStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    fail_primary_reads: AtomicBool,
    fail_replica_reads: AtomicBool,
    truncate_after_next_write: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
    writes: AtomicU64,
    primary_reads: AtomicU64,
    replica_reads: AtomicU64,
    resets: AtomicU64,
}

impl InMemoryProbeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, target: ReadTarget, fail: bool) {
        match target {
            ReadTarget::Primary => self.fail_primary_reads.store(fail, Ordering::SeqCst),
            ReadTarget::Replica => self.fail_replica_reads.store(fail, Ordering::SeqCst),
        }
    }

    /// Stop (or resume) replication to the replica view
    pub fn set_replica_frozen(&self, frozen: bool) {
        let mut tables = self.tables.lock();
        let snapshot = frozen.then(|| tables.primary.clone());
        tables.replica_snapshot = snapshot;
    }

    /// Simulate an external reset landing between the next write and its reads
    pub fn truncate_after_next_write(&self) {
        self.truncate_after_next_write.store(true, Ordering::SeqCst);
    }

    pub fn set_read_delay(&self, delay: Option<Duration>) {
        *self.read_delay.lock() = delay;
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self, target: ReadTarget) -> u64 {
        match target {
            ReadTarget::Primary => self.primary_reads.load(Ordering::SeqCst),
            ReadTarget::Replica => self.replica_reads.load(Ordering::SeqCst),
        }
    }

    pub fn reset_count(&self) -> u64 {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn row_count(&self) -> usize {
        self.tables.lock().primary.len()
    }

    fn status_of(rows: &[DateTime<Utc>], address: &str) -> Option<StatusRecord> {
        rows.iter()
            .max()
            .map(|latest| StatusRecord::new(*latest, rows.len() as i64, address))
    }
}

#[async_trait]
impl ProbeStore for InMemoryProbeStore {
    async fn write_timestamp(&self, at: DateTime<Utc>) -> Result<WriteReceipt> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProbeError::connection(
                StoreTarget::PrimaryWrite.label(),
                "simulated outage",
            ));
        }

        let mut tables = self.tables.lock();
        tables.primary.push(at);
        if self.truncate_after_next_write.swap(false, Ordering::SeqCst) {
            tables.primary.clear();
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(WriteReceipt::new(at))
    }

    async fn read_status(&self, target: ReadTarget) -> Result<Option<StatusRecord>> {
        let delay = *self.read_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let (counter, failing) = match target {
            ReadTarget::Primary => (&self.primary_reads, &self.fail_primary_reads),
            ReadTarget::Replica => (&self.replica_reads, &self.fail_replica_reads),
        };
        counter.fetch_add(1, Ordering::SeqCst);

        if failing.load(Ordering::SeqCst) {
            return Err(ProbeError::connection(
                target.store_target().label(),
                "simulated outage",
            ));
        }

        let tables = self.tables.lock();
        Ok(match target {
            ReadTarget::Primary => Self::status_of(&tables.primary, PRIMARY_ADDRESS),
            ReadTarget::Replica => Self::status_of(
                tables.replica_snapshot.as_deref().unwrap_or(&tables.primary[..]),
                REPLICA_ADDRESS,
            ),
        })
    }

    async fn reset_all(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProbeError::connection(
                StoreTarget::PrimaryWrite.label(),
                "simulated outage",
            ));
        }

        let mut tables = self.tables.lock();
        tables.primary.clear();
        if let Some(snapshot) = tables.replica_snapshot.as_mut() {
            snapshot.clear();
        }
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
