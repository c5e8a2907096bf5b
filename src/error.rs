//! # Probe Error Types
//!
//! Structured errors for the store boundary, the scheduler lifecycle and
//! configuration loading.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Database connection error: {target}: {message}")]
    Connection { target: String, message: String },

    #[error("Database query error: {target}: {operation}: {message}")]
    Query {
        target: String,
        operation: String,
        message: String,
    },

    #[error("Database operation timed out: {target}: {operation} after {timeout_ms}ms")]
    Timeout {
        target: String,
        operation: String,
        timeout_ms: u64,
    },

    #[error("Probe scheduler is already running")]
    AlreadyRunning,

    #[error("Probe scheduler did not stop within {timeout_ms}ms and was aborted")]
    StopTimeout { timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProbeError {
    pub fn connection(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn query(
        target: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Query {
            target: target.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn timeout(target: impl Into<String>, operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            target: target.into(),
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// True for failures at the store boundary (connectivity, query, timeout).
    ///
    /// These are transient from the probe's point of view: they are reported
    /// and the next cycle runs regardless.
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Query { .. } | Self::Timeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
