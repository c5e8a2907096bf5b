//! # Web Application State
//!
//! Shared handles the HTTP handlers need: the store for on-demand reads and
//! resets, the scheduler for its last cycle, and the loaded configuration.

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::ProbeConfig;
use crate::database::ProbeStore;
use crate::probe::PeriodicScheduler;

pub struct AppState {
    pub store: Arc<dyn ProbeStore>,
    pub scheduler: Arc<PeriodicScheduler>,
    pub config: Arc<ProbeConfig>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProbeStore>,
        scheduler: Arc<PeriodicScheduler>,
        config: Arc<ProbeConfig>,
    ) -> Arc<Self> {
        info!(
            bind_address = %config.bind_address,
            request_timeout_ms = config.request_timeout_ms,
            "Web application state initialized"
        );
        Arc::new(Self {
            store,
            scheduler,
            config,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
