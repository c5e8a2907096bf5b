//! Probe wiring over the in-memory store, shared by the integration tests.

use std::sync::Arc;
use std::time::Duration;

use pgtester::config::ProbeConfig;
use pgtester::database::ProbeStore;
use pgtester::models::ReceiptClock;
use pgtester::probe::{PeriodicScheduler, ProbeCycle, StartupProbe};
use pgtester::test_helpers::InMemoryProbeStore;
use pgtester::web::AppState;

/// Short enough to keep tests quick, long enough for a cycle to finish in between
pub const TEST_INTERVAL: Duration = Duration::from_millis(50);

pub struct ProbeHarness {
    pub store: Arc<InMemoryProbeStore>,
    pub clock: Arc<ReceiptClock>,
    pub scheduler: Arc<PeriodicScheduler>,
}

impl ProbeHarness {
    pub fn new() -> Self {
        Self::with_stop_timeout(Duration::from_secs(5))
    }

    pub fn with_stop_timeout(stop_timeout: Duration) -> Self {
        let store = Arc::new(InMemoryProbeStore::new());
        let clock = Arc::new(ReceiptClock::new());
        let scheduler = Arc::new(PeriodicScheduler::new(
            ProbeCycle::new(store.clone(), clock.clone()),
            stop_timeout,
        ));
        Self {
            store,
            clock,
            scheduler,
        }
    }

    pub fn startup_probe(&self) -> StartupProbe {
        StartupProbe::new(self.store.clone(), self.clock.clone())
    }

    pub fn app_state(&self) -> Arc<AppState> {
        let store: Arc<dyn ProbeStore> = self.store.clone();
        AppState::new(store, self.scheduler.clone(), Arc::new(test_config()))
    }

    /// Poll until `done` holds or `timeout` elapses
    pub async fn wait_until(&self, timeout: Duration, done: impl Fn(&Self) -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if done(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        done(self)
    }
}

pub fn test_config() -> ProbeConfig {
    ProbeConfig {
        periodic_interval: 1,
        operation_timeout_ms: 500,
        stop_timeout_ms: 1_000,
        request_timeout_ms: 2_000,
        ..ProbeConfig::default()
    }
}
