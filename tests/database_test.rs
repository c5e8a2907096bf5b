//! # Live PostgreSQL Tests
//!
//! Each test gets its own database from `#[sqlx::test]`, created on the
//! server named by `DATABASE_URL`. Run with `cargo test -- --ignored`. The
//! primary and replica paths both point at the test database, so a single
//! server exercises both read paths.

use chrono::Utc;
use pgtester::config::ProbeConfig;
use pgtester::database::{
    ensure_schema, PgProbeStore, ProbeStore, ReadTarget, SchemaAction, TargetConnector,
};
use pgtester::error::ProbeError;
use pgtester::models::{truncate_to_micros, ReceiptClock};
use pgtester::probe::{evaluate, ConsistencyOutcome};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

async fn store_with_schema(opts: PgConnectOptions) -> PgProbeStore {
    let connector = TargetConnector::new(opts.clone(), opts, Duration::from_secs(5));
    let store = PgProbeStore::new(connector);
    let action = ensure_schema(store.connector(), false).await.unwrap();
    assert_eq!(action, SchemaAction::Created);
    store
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_ensure_schema_retains_existing_table(_: PgPoolOptions, opts: PgConnectOptions) {
    let store = store_with_schema(opts).await;
    let action = ensure_schema(store.connector(), false).await.unwrap();
    assert_eq!(action, SchemaAction::Retained);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_ensure_schema_reset_drops_rows(_: PgPoolOptions, opts: PgConnectOptions) {
    let store = store_with_schema(opts).await;
    store.write_timestamp(Utc::now()).await.unwrap();

    let action = ensure_schema(store.connector(), true).await.unwrap();
    assert_eq!(action, SchemaAction::Created);
    assert_eq!(store.read_status(ReadTarget::Primary).await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_empty_table_reads_none(_: PgPoolOptions, opts: PgConnectOptions) {
    let store = store_with_schema(opts).await;
    assert_eq!(store.read_status(ReadTarget::Primary).await.unwrap(), None);
    assert_eq!(store.read_status(ReadTarget::Replica).await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_write_then_read_is_consistent_on_primary(_: PgPoolOptions, opts: PgConnectOptions) {
    let store = store_with_schema(opts).await;
    let clock = ReceiptClock::new();

    let receipt = store.write_timestamp(clock.now()).await.unwrap();
    let status = store.read_status(ReadTarget::Primary).await.unwrap();

    assert_eq!(evaluate(&receipt, status.as_ref()), ConsistencyOutcome::Consistent);
    assert_eq!(status.unwrap().total_writes, 1);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_receipt_matches_committed_precision(_: PgPoolOptions, opts: PgConnectOptions) {
    let store = store_with_schema(opts).await;

    // Nanosecond input is stored at microsecond precision
    let receipt = store.write_timestamp(Utc::now()).await.unwrap();
    assert_eq!(receipt.written_at, truncate_to_micros(receipt.written_at));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_reset_empties_table(_: PgPoolOptions, opts: PgConnectOptions) {
    let store = store_with_schema(opts).await;
    let clock = ReceiptClock::new();
    store.write_timestamp(clock.now()).await.unwrap();
    store.write_timestamp(clock.now()).await.unwrap();
    assert_eq!(
        store
            .read_status(ReadTarget::Primary)
            .await
            .unwrap()
            .map(|s| s.total_writes),
        Some(2)
    );

    store.reset_all().await.unwrap();
    assert_eq!(store.read_status(ReadTarget::Primary).await.unwrap(), None);
}

#[tokio::test]
async fn test_unreachable_host_is_access_error() {
    let config = ProbeConfig {
        postgres_ro_host: "127.0.0.1".to_string(),
        postgres_port: 1,
        operation_timeout_ms: 2_000,
        ..ProbeConfig::default()
    };
    let store = PgProbeStore::from_config(&config);

    let started = std::time::Instant::now();
    let err = store.read_status(ReadTarget::Replica).await.unwrap_err();
    assert!(err.is_access_error());
    assert!(matches!(
        err,
        ProbeError::Connection { .. } | ProbeError::Timeout { .. }
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}
