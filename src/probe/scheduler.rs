//! # Periodic Probe Scheduler
//!
//! Owns the single background activity that runs a [`ProbeCycle`] on a fixed
//! cadence.
//!
//! Lifecycle: `Idle -> Running -> StopRequested -> Idle`. `start` on a
//! running scheduler is rejected with [`ProbeError::AlreadyRunning`]; `stop`
//! does not return until the background task has exited, so no cycle begins
//! after it returns. A cycle already executing when stop is requested is
//! allowed to finish.
//!
//! Start and stop are serialised through one async mutex, which is held for
//! the whole of `stop` including the join. A `start` racing a `stop`
//! therefore waits for the old activity to be gone.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::cycle::{CycleReport, ProbeCycle};
use crate::error::{ProbeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerLifecycle {
    Idle,
    Running,
    StopRequested,
}

/// Point-in-time view of the scheduler for status pages
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerSnapshot {
    pub lifecycle: SchedulerLifecycle,
    pub interval_seconds: Option<f64>,
    pub running_since: Option<DateTime<Utc>>,
    pub cycles_completed: u64,
    pub last_report: Option<CycleReport>,
}

struct ActiveProbe {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Debug, Clone, Copy)]
struct LifecycleView {
    lifecycle: SchedulerLifecycle,
    interval: Option<Duration>,
    running_since: Option<DateTime<Utc>>,
}

impl LifecycleView {
    fn idle() -> Self {
        Self {
            lifecycle: SchedulerLifecycle::Idle,
            interval: None,
            running_since: None,
        }
    }
}

/// Results published by the loop, readable from any context
#[derive(Default)]
struct ProbeBoard {
    last_report: RwLock<Option<CycleReport>>,
    cycles_completed: AtomicU64,
}

impl ProbeBoard {
    fn next_cycle_number(&self) -> u64 {
        self.cycles_completed.load(Ordering::Acquire) + 1
    }

    fn publish(&self, report: CycleReport) {
        *self.last_report.write() = Some(report);
        self.cycles_completed.fetch_add(1, Ordering::AcqRel);
    }
}

pub struct PeriodicScheduler {
    cycle: ProbeCycle,
    stop_timeout: Duration,
    /// Exclusive start/stop state; only `start` and `stop` touch it
    active: Mutex<Option<ActiveProbe>>,
    view: RwLock<LifecycleView>,
    board: Arc<ProbeBoard>,
}

impl PeriodicScheduler {
    pub fn new(cycle: ProbeCycle, stop_timeout: Duration) -> Self {
        Self {
            cycle,
            stop_timeout,
            active: Mutex::new(None),
            view: RwLock::new(LifecycleView::idle()),
            board: Arc::new(ProbeBoard::default()),
        }
    }

    /// Launch the periodic loop. Returns without waiting for the first cycle,
    /// which runs one `interval` after the call.
    #[instrument(skip(self), fields(interval_ms = interval.as_millis() as u64))]
    pub async fn start(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(ProbeError::Configuration(
                "probe interval must be greater than zero".to_string(),
            ));
        }

        let mut active = self.active.lock().await;

        if let Some(existing) = active.as_ref() {
            if !existing.handle.is_finished() {
                warn!("Rejecting start: periodic probe is already running");
                return Err(ProbeError::AlreadyRunning);
            }
            error!("Periodic probe loop had exited without a stop request; restarting");
            active.take();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.cycle.clone(),
            interval,
            cancel.clone(),
            self.board.clone(),
        ));

        *active = Some(ActiveProbe { cancel, handle });
        *self.view.write() = LifecycleView {
            lifecycle: SchedulerLifecycle::Running,
            interval: Some(interval),
            running_since: Some(Utc::now()),
        };

        info!(interval_s = interval.as_secs_f64(), "Periodic probe started");
        Ok(())
    }

    /// Request the loop to stop and wait for it to exit.
    ///
    /// A no-op when idle. If the loop has not exited within the stop timeout
    /// (a store call stuck past its own timeout), the task is aborted and
    /// still joined before returning [`ProbeError::StopTimeout`]; the
    /// scheduler is idle either way.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        let mut active = self.active.lock().await;

        let Some(ActiveProbe { cancel, mut handle }) = active.take() else {
            debug!("Stop requested while idle");
            return Ok(());
        };

        self.view.write().lifecycle = SchedulerLifecycle::StopRequested;
        info!("Stopping periodic probe");
        cancel.cancel();

        let result = match tokio::time::timeout(self.stop_timeout, &mut handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!(error = %e, "Periodic probe task ended abnormally");
                Ok(())
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "Periodic probe did not stop in time, aborting"
                );
                handle.abort();
                let _ = handle.await;
                Err(ProbeError::StopTimeout {
                    timeout_ms: self.stop_timeout.as_millis() as u64,
                })
            }
        };

        *self.view.write() = LifecycleView::idle();
        drop(active);

        info!(
            cycles_completed = self.cycles_completed(),
            "Periodic probe stopped"
        );
        result
    }

    pub fn lifecycle(&self) -> SchedulerLifecycle {
        self.view.read().lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle() != SchedulerLifecycle::Idle
    }

    /// Most recent completed cycle, if any
    pub fn last_report(&self) -> Option<CycleReport> {
        self.board.last_report.read().clone()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.board.cycles_completed.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let view = *self.view.read();
        SchedulerSnapshot {
            lifecycle: view.lifecycle,
            interval_seconds: view.interval.map(|i| i.as_secs_f64()),
            running_since: view.running_since,
            cycles_completed: self.cycles_completed(),
            last_report: self.last_report(),
        }
    }
}

impl Drop for PeriodicScheduler {
    fn drop(&mut self) {
        // Without a runtime to join on, the best we can do is signal the loop
        if let Some(active) = self.active.get_mut().as_ref() {
            active.cancel.cancel();
        }
    }
}

async fn run_loop(
    cycle: ProbeCycle,
    interval: Duration,
    cancel: CancellationToken,
    board: Arc<ProbeBoard>,
) {
    // First cycle one full interval after start
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("Periodic probe loop running");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Periodic probe loop observed stop request");
                break;
            }
            _ = ticker.tick() => {
                let report = cycle.run(board.next_cycle_number()).await;
                board.publish(report);
            }
        }
    }

    debug!("Periodic probe loop exited");
}
