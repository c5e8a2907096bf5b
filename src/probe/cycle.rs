//! One write-then-read-then-evaluate cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::evaluator::{ConsistencyOutcome, OutcomeSeverity};
use crate::constants::PROBE_TABLE;
use crate::database::{ProbeStore, ReadTarget, StoreTarget};
use crate::models::{format_status, ReceiptClock, StatusRecord, WriteReceipt};

/// Outcome of the write step of a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WriteOutcome {
    Committed { receipt: WriteReceipt },
    Failed { error: String },
}

/// What one read target returned and how it compared to the receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetObservation {
    pub target: ReadTarget,
    pub status: Option<StatusRecord>,
    pub outcome: ConsistencyOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub write: WriteOutcome,
    /// Empty when the write failed
    pub observations: Vec<TargetObservation>,
}

impl CycleReport {
    pub fn receipt(&self) -> Option<&WriteReceipt> {
        match &self.write {
            WriteOutcome::Committed { receipt } => Some(receipt),
            WriteOutcome::Failed { .. } => None,
        }
    }

    pub fn outcome(&self, target: ReadTarget) -> Option<&ConsistencyOutcome> {
        self.observations
            .iter()
            .find(|o| o.target == target)
            .map(|o| &o.outcome)
    }

    /// Write committed and every target read back exactly what was written
    pub fn is_consistent(&self) -> bool {
        self.receipt().is_some()
            && !self.observations.is_empty()
            && self.observations.iter().all(|o| o.outcome.is_consistent())
    }
}

/// Executes cycles against a store. Cheap to clone.
#[derive(Clone)]
pub struct ProbeCycle {
    store: Arc<dyn ProbeStore>,
    clock: Arc<ReceiptClock>,
}

impl ProbeCycle {
    pub fn new(store: Arc<dyn ProbeStore>, clock: Arc<ReceiptClock>) -> Self {
        Self { store, clock }
    }

    /// Run one cycle. Store failures are reported in the returned report and
    /// in the log; they never escape as errors.
    pub async fn run(&self, cycle: u64) -> CycleReport {
        let started = Instant::now();

        let receipt = match self.store.write_timestamp(self.clock.now()).await {
            Ok(receipt) => {
                info!(
                    cycle = cycle,
                    written_at = %receipt.written_at,
                    "Wrote \"{}\" to table \"{}\"",
                    receipt.written_at,
                    PROBE_TABLE
                );
                receipt
            }
            Err(e) => {
                error!(
                    cycle = cycle,
                    target = StoreTarget::PrimaryWrite.label(),
                    error = %e,
                    "Error accessing DB: probe write failed, skipping read-back for this cycle"
                );
                return CycleReport {
                    cycle,
                    completed_at: Utc::now(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    write: WriteOutcome::Failed {
                        error: e.to_string(),
                    },
                    observations: Vec::new(),
                };
            }
        };

        // Both reads are checked against the same receipt; their relative order is irrelevant
        let (primary, replica) = tokio::join!(
            self.observe(cycle, &receipt, ReadTarget::Primary),
            self.observe(cycle, &receipt, ReadTarget::Replica),
        );

        CycleReport {
            cycle,
            completed_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
            write: WriteOutcome::Committed { receipt },
            observations: vec![primary, replica],
        }
    }

    async fn observe(
        &self,
        cycle: u64,
        receipt: &WriteReceipt,
        target: ReadTarget,
    ) -> TargetObservation {
        let read = self.store.read_status(target).await;
        let outcome = ConsistencyOutcome::from_read(receipt, &read);
        let status = read.ok().flatten();

        report_outcome(cycle, target, &outcome, status.as_ref());

        TargetObservation {
            target,
            status,
            outcome,
        }
    }
}

fn report_outcome(
    cycle: u64,
    target: ReadTarget,
    outcome: &ConsistencyOutcome,
    status: Option<&StatusRecord>,
) {
    let rendered = status.map(format_status);

    match outcome.severity() {
        OutcomeSeverity::Info => {
            info!(
                cycle = cycle,
                target = %target,
                "{}",
                rendered.as_deref().unwrap_or("consistent")
            );
        }
        OutcomeSeverity::Warning => {
            let message = match outcome {
                ConsistencyOutcome::EmptyResponse => "Empty response from DB",
                _ => "Different timestamp read after write!",
            };
            warn!(
                cycle = cycle,
                target = %target,
                outcome = outcome.kind(),
                delta_us = outcome.delta().and_then(|d| d.num_microseconds()),
                status = rendered.as_deref(),
                "{}",
                message
            );
        }
        OutcomeSeverity::Error => {
            error!(cycle = cycle, target = %target, error = %outcome, "Error accessing DB");
        }
    }
}
