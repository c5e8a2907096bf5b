#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # pgtester
//!
//! Liveness and read-your-write consistency probe for a PostgreSQL primary
//! and its streaming read replica.
//!
//! ## Overview
//!
//! At a fixed interval the probe writes the current timestamp to the primary,
//! reads the latest status back from both the primary and the replica, and
//! reports whether each side returned exactly the value just written. Lag,
//! empty tables and unreachable servers are logged and surfaced over HTTP;
//! none of them stop the probe.
//!
//! ## Module Organization
//!
//! - [`database`] - Connections, the [`ProbeStore`](database::ProbeStore) seam and schema setup
//! - [`models`] - Status records and write receipts
//! - [`probe`] - Cycle execution, consistency evaluation, the periodic scheduler and startup probe
//! - [`web`] - `axum` status, reset and health endpoints
//! - [`config`] - Layered configuration (defaults, TOML, environment)
//! - [`error`] - Structured error handling
//! - [`logging`] - `tracing` subscriber setup
//! - [`test_helpers`] - In-memory store and live-database settings for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pgtester::config::ConfigManager;
//! use pgtester::database::{PgProbeStore, ProbeStore};
//! use pgtester::models::ReceiptClock;
//! use pgtester::probe::{PeriodicScheduler, ProbeCycle, StartupProbe};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(None)?;
//! let config = manager.config();
//!
//! let store: Arc<dyn ProbeStore> = Arc::new(PgProbeStore::from_config(config));
//! let clock = Arc::new(ReceiptClock::new());
//!
//! StartupProbe::new(store.clone(), clock.clone()).run_once().await;
//!
//! let scheduler = PeriodicScheduler::new(ProbeCycle::new(store, clock), config.stop_timeout());
//! scheduler.start(config.interval()).await?;
//! // ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                      # Unit and in-memory integration tests
//! cargo test -- --ignored         # Live PostgreSQL tests (DATABASE_URL)
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod probe;
pub mod test_helpers;
pub mod web;

pub use config::{ConfigManager, ProbeConfig};
pub use database::{PgProbeStore, ProbeStore, ReadTarget};
pub use error::{ProbeError, Result};
pub use models::{StatusRecord, WriteReceipt};
pub use probe::{ConsistencyOutcome, PeriodicScheduler, ProbeCycle, StartupProbe};
