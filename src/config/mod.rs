//! # Probe Configuration
//!
//! Connection settings for the primary and replica, the probe cadence and the
//! ambient timeouts. Values are layered by [`ConfigManager`]: built-in
//! defaults, then an optional TOML file, then `PGTESTER_*` environment
//! variables.
//!
//! ```rust,no_run
//! use pgtester::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(None)?;
//! let interval = manager.config().interval();
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::defaults;
use crate::error::{ProbeError, Result};

pub use loader::ConfigManager;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Seconds between probe cycles
    pub periodic_interval: u64,
    /// Primary (write) host
    pub postgres_host: String,
    /// Read-replica host
    pub postgres_ro_host: String,
    pub postgres_port: u16,
    pub postgres_db: String,
    pub postgres_user: String,
    pub postgres_password: String,
    /// HTTP listen address for the status endpoints
    pub bind_address: String,
    /// Upper bound on any single store call, connect included
    pub operation_timeout_ms: u64,
    /// How long `stop()` waits for the loop before aborting it
    pub stop_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            periodic_interval: defaults::PERIODIC_INTERVAL_SECONDS,
            postgres_host: defaults::POSTGRES_HOST.to_string(),
            postgres_ro_host: defaults::POSTGRES_RO_HOST.to_string(),
            postgres_port: defaults::POSTGRES_PORT,
            postgres_db: defaults::POSTGRES_DB.to_string(),
            postgres_user: defaults::POSTGRES_USER.to_string(),
            postgres_password: defaults::POSTGRES_PASSWORD.to_string(),
            bind_address: defaults::BIND_ADDRESS.to_string(),
            operation_timeout_ms: defaults::OPERATION_TIMEOUT_MS,
            stop_timeout_ms: defaults::STOP_TIMEOUT_MS,
            request_timeout_ms: defaults::REQUEST_TIMEOUT_MS,
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.periodic_interval)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.periodic_interval == 0 {
            return Err(ProbeError::Configuration(
                "periodic_interval must be at least 1 second".to_string(),
            ));
        }

        for (key, value) in [
            ("postgres_host", &self.postgres_host),
            ("postgres_ro_host", &self.postgres_ro_host),
            ("postgres_db", &self.postgres_db),
            ("postgres_user", &self.postgres_user),
            ("bind_address", &self.bind_address),
        ] {
            if value.trim().is_empty() {
                return Err(ProbeError::Configuration(format!("{key} must not be empty")));
            }
        }

        if self.postgres_port == 0 {
            return Err(ProbeError::Configuration(
                "postgres_port must be non-zero".to_string(),
            ));
        }

        for (key, value) in [
            ("operation_timeout_ms", self.operation_timeout_ms),
            ("stop_timeout_ms", self.stop_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ] {
            if value == 0 {
                return Err(ProbeError::Configuration(format!("{key} must be non-zero")));
            }
        }

        Ok(())
    }
}
