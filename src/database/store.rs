//! # Probe Store
//!
//! The three primitive operations the probe performs against the backing
//! table: insert a timestamp, read the latest status, truncate everything.
//! Each call opens its own connection and releases it on every exit path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Connection;
use tracing::debug;

use super::connection::{map_sqlx_error, ReadTarget, StoreTarget, TargetConnector};
use crate::config::ProbeConfig;
use crate::constants::operations;
use crate::error::Result;
use crate::models::{StatusRecord, WriteReceipt};

const INSERT_TIMESTAMP_SQL: &str = r#"
    INSERT INTO test_writes (write_ts)
    VALUES ($1)
    RETURNING write_ts
"#;

const SELECT_LATEST_STATUS_SQL: &str = r#"
    SELECT write_ts AS last_write_ts,
           (SELECT COUNT(*) FROM test_writes) AS total_writes,
           COALESCE(host(inet_server_addr()), 'local') AS server_address
    FROM test_writes
    ORDER BY write_ts DESC
    LIMIT 1
"#;

const TRUNCATE_SQL: &str = "TRUNCATE test_writes";

/// Data-store operations used by the probe, the startup check and the web layer
#[async_trait]
pub trait ProbeStore: Send + Sync {
    /// Insert one row stamped `at` on the primary and commit it.
    ///
    /// Returns the timestamp as committed.
    async fn write_timestamp(&self, at: DateTime<Utc>) -> Result<WriteReceipt>;

    /// Latest row, total row count and answering server address as seen from
    /// `target`. `None` when the table is empty.
    async fn read_status(&self, target: ReadTarget) -> Result<Option<StatusRecord>>;

    /// Remove every row via the primary
    async fn reset_all(&self) -> Result<()>;
}

/// PostgreSQL-backed [`ProbeStore`]
#[derive(Debug, Clone)]
pub struct PgProbeStore {
    connector: TargetConnector,
}

impl PgProbeStore {
    pub fn new(connector: TargetConnector) -> Self {
        Self { connector }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(TargetConnector::from_config(config))
    }

    pub fn connector(&self) -> &TargetConnector {
        &self.connector
    }
}

#[async_trait]
impl ProbeStore for PgProbeStore {
    async fn write_timestamp(&self, at: DateTime<Utc>) -> Result<WriteReceipt> {
        let target = StoreTarget::PrimaryWrite;
        let op = operations::INSERT_TIMESTAMP;

        self.connector
            .bounded(target, op, async {
                let mut conn = self.connector.acquire(target).await?;

                let mut tx = conn
                    .begin()
                    .await
                    .map_err(|e| map_sqlx_error(target, op, e))?;
                let written_at: DateTime<Utc> = sqlx::query_scalar(INSERT_TIMESTAMP_SQL)
                    .bind(at)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error(target, op, e))?;
                tx.commit().await.map_err(|e| map_sqlx_error(target, op, e))?;

                self.connector.release(target, conn).await;

                debug!(target = %target, written_at = %written_at, "Wrote timestamp to test_writes");
                Ok(WriteReceipt::new(written_at))
            })
            .await
    }

    async fn read_status(&self, read_target: ReadTarget) -> Result<Option<StatusRecord>> {
        let target = read_target.store_target();
        let op = operations::SELECT_LATEST_STATUS;

        self.connector
            .bounded(target, op, async {
                let mut conn = self.connector.acquire(target).await?;

                let status = sqlx::query_as::<_, StatusRecord>(SELECT_LATEST_STATUS_SQL)
                    .fetch_optional(&mut conn)
                    .await
                    .map_err(|e| map_sqlx_error(target, op, e))?;

                self.connector.release(target, conn).await;
                Ok(status)
            })
            .await
    }

    async fn reset_all(&self) -> Result<()> {
        let target = StoreTarget::PrimaryWrite;
        let op = operations::TRUNCATE_ALL;

        self.connector
            .bounded(target, op, async {
                let mut conn = self.connector.acquire(target).await?;

                let mut tx = conn
                    .begin()
                    .await
                    .map_err(|e| map_sqlx_error(target, op, e))?;
                sqlx::query(TRUNCATE_SQL)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error(target, op, e))?;
                tx.commit().await.map_err(|e| map_sqlx_error(target, op, e))?;

                self.connector.release(target, conn).await;

                debug!(target = %target, "Truncated test_writes");
                Ok(())
            })
            .await
    }
}
