//! Schema management for the probe table.
//!
//! Used by the `init-db` command only; the probe itself assumes the table
//! exists.

use serde::Serialize;
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use tracing::info;

use super::connection::{map_sqlx_error, StoreTarget, TargetConnector};
use crate::constants::{operations, PROBE_TABLE};
use crate::error::Result;

const DROP_TABLE_SQL: &str = "DROP TABLE IF EXISTS test_writes CASCADE";

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE test_writes (
        id SERIAL PRIMARY KEY,
        write_ts TIMESTAMP WITH TIME ZONE NOT NULL
    )
"#;

/// What [`ensure_schema`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaAction {
    Created,
    Retained,
}

pub async fn schema_exists(conn: &mut PgConnection) -> Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(PROBE_TABLE)
    .fetch_one(conn)
    .await
    .map_err(|e| map_sqlx_error(StoreTarget::PrimaryWrite, operations::SCHEMA_EXISTS, e))
}

/// Drop and recreate the probe table
pub async fn init_schema(conn: &mut PgConnection) -> Result<()> {
    let target = StoreTarget::PrimaryWrite;
    let op = operations::INIT_SCHEMA;

    let mut tx = conn.begin().await.map_err(|e| map_sqlx_error(target, op, e))?;
    sqlx::query(DROP_TABLE_SQL)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(target, op, e))?;
    sqlx::query(CREATE_TABLE_SQL)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(target, op, e))?;
    tx.commit().await.map_err(|e| map_sqlx_error(target, op, e))
}

/// Create the table when missing, or unconditionally when `reset` is set
pub async fn ensure_schema(connector: &TargetConnector, reset: bool) -> Result<SchemaAction> {
    let target = StoreTarget::PrimaryWrite;

    let action = connector
        .bounded(target, operations::INIT_SCHEMA, async {
            let mut conn = connector.acquire(target).await?;

            let action = if reset || !schema_exists(&mut conn).await? {
                init_schema(&mut conn).await?;
                SchemaAction::Created
            } else {
                SchemaAction::Retained
            };

            connector.release(target, conn).await;
            Ok(action)
        })
        .await?;

    info!(table = PROBE_TABLE, action = ?action, reset = reset, "Schema check complete");
    Ok(action)
}
