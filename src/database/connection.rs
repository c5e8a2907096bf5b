use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};

/// Logical connection target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreTarget {
    PrimaryWrite,
    PrimaryRead,
    ReplicaRead,
}

impl StoreTarget {
    pub fn label(&self) -> &'static str {
        match self {
            StoreTarget::PrimaryWrite => "primary-write",
            StoreTarget::PrimaryRead => "primary-read",
            StoreTarget::ReplicaRead => "replica-read",
        }
    }
}

impl fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target of a status read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadTarget {
    Primary,
    Replica,
}

impl ReadTarget {
    pub fn store_target(&self) -> StoreTarget {
        match self {
            ReadTarget::Primary => StoreTarget::PrimaryRead,
            ReadTarget::Replica => StoreTarget::ReplicaRead,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadTarget::Primary => "primary",
            ReadTarget::Replica => "replica",
        }
    }
}

impl fmt::Display for ReadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opens one fresh connection per store call.
///
/// Connections are never cached between calls, and the primary and replica
/// paths never share one.
#[derive(Debug, Clone)]
pub struct TargetConnector {
    primary: PgConnectOptions,
    replica: PgConnectOptions,
    operation_timeout: Duration,
}

impl TargetConnector {
    pub fn new(
        primary: PgConnectOptions,
        replica: PgConnectOptions,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            replica,
            operation_timeout,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        let base = |host: &str| {
            PgConnectOptions::new()
                .host(host)
                .port(config.postgres_port)
                .database(&config.postgres_db)
                .username(&config.postgres_user)
                .password(&config.postgres_password)
                .application_name("pgtester")
        };

        Self::new(
            base(&config.postgres_host),
            base(&config.postgres_ro_host),
            config.operation_timeout(),
        )
    }

    pub fn connect_options(&self, target: StoreTarget) -> &PgConnectOptions {
        match target {
            StoreTarget::PrimaryWrite | StoreTarget::PrimaryRead => &self.primary,
            StoreTarget::ReplicaRead => &self.replica,
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Open a connection to `target`
    pub async fn acquire(&self, target: StoreTarget) -> Result<PgConnection> {
        PgConnection::connect_with(self.connect_options(target))
            .await
            .map_err(|e| ProbeError::connection(target.label(), e.to_string()))
    }

    /// Close a connection gracefully. A failed goodbye is not an operation
    /// failure; dropping the connection closes the socket regardless.
    pub async fn release(&self, target: StoreTarget, conn: PgConnection) {
        if let Err(e) = conn.close().await {
            debug!(target = %target, error = %e, "Connection close was not graceful");
        }
    }

    /// Run a store operation under the configured operation timeout.
    ///
    /// On timeout the operation future is dropped, which drops any connection
    /// it holds.
    pub async fn bounded<T, F>(&self, target: StoreTarget, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::timeout(
                target.label(),
                operation,
                self.operation_timeout.as_millis() as u64,
            )),
        }
    }
}

/// Map a driver error to the probe taxonomy. Transport-level failures are
/// connectivity errors even when they surface mid-query.
pub(crate) fn map_sqlx_error(target: StoreTarget, operation: &str, err: sqlx::Error) -> ProbeError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            ProbeError::connection(target.label(), format!("{operation}: {err}"))
        }
        other => ProbeError::query(target.label(), operation, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_route_to_configured_hosts() {
        let config = ProbeConfig {
            postgres_host: "primary.db".to_string(),
            postgres_ro_host: "replica.db".to_string(),
            postgres_port: 6432,
            ..ProbeConfig::default()
        };
        let connector = TargetConnector::from_config(&config);

        assert_eq!(connector.connect_options(StoreTarget::PrimaryWrite).get_host(), "primary.db");
        assert_eq!(connector.connect_options(StoreTarget::PrimaryRead).get_host(), "primary.db");
        assert_eq!(connector.connect_options(StoreTarget::ReplicaRead).get_host(), "replica.db");
        assert_eq!(connector.connect_options(StoreTarget::ReplicaRead).get_port(), 6432);
    }

    #[test]
    fn test_explicit_options_keep_targets_apart() {
        let primary = PgConnectOptions::new().host("10.0.0.1").database("probe_a");
        let replica = PgConnectOptions::new().host("10.0.0.2").database("probe_a");
        let connector = TargetConnector::new(primary, replica, Duration::from_millis(750));

        assert_eq!(connector.connect_options(StoreTarget::PrimaryWrite).get_host(), "10.0.0.1");
        assert_eq!(connector.connect_options(StoreTarget::ReplicaRead).get_host(), "10.0.0.2");
        assert_eq!(
            connector.connect_options(StoreTarget::ReplicaRead).get_database(),
            Some("probe_a")
        );
        assert_eq!(connector.operation_timeout(), Duration::from_millis(750));
    }

    #[test]
    fn test_read_target_mapping() {
        assert_eq!(ReadTarget::Primary.store_target(), StoreTarget::PrimaryRead);
        assert_eq!(ReadTarget::Replica.store_target(), StoreTarget::ReplicaRead);
        assert_eq!(ReadTarget::Replica.to_string(), "replica");
        assert_eq!(StoreTarget::PrimaryWrite.to_string(), "primary-write");
    }

    #[test]
    fn test_io_errors_are_connection_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = map_sqlx_error(StoreTarget::ReplicaRead, "select_latest_status", io.into());
        assert!(matches!(err, ProbeError::Connection { ref target, .. } if target == "replica-read"));

        let err = map_sqlx_error(StoreTarget::PrimaryWrite, "insert_timestamp", sqlx::Error::RowNotFound);
        assert!(matches!(err, ProbeError::Query { ref operation, .. } if operation == "insert_timestamp"));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let config = ProbeConfig {
            operation_timeout_ms: 20,
            ..ProbeConfig::default()
        };
        let connector = TargetConnector::from_config(&config);

        let result: Result<()> = connector
            .bounded(StoreTarget::PrimaryRead, "select_latest_status", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ProbeError::Timeout { timeout_ms: 20, .. })));
    }
}
