//! # Database Operations
//!
//! Store access for the probe against a PostgreSQL primary and its read
//! replica.
//!
//! - [`connection`] - per-target connection options, acquisition and timeouts
//! - [`store`] - the [`ProbeStore`] seam and its PostgreSQL implementation
//! - [`schema`] - creation and reset of the probe table
//!
//! ```rust,no_run
//! use pgtester::config::ProbeConfig;
//! use pgtester::database::{PgProbeStore, ProbeStore, ReadTarget};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PgProbeStore::from_config(&ProbeConfig::default());
//! if let Some(status) = store.read_status(ReadTarget::Replica).await? {
//!     println!("{status}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod schema;
pub mod store;

pub use connection::{ReadTarget, StoreTarget, TargetConnector};
pub use schema::{ensure_schema, SchemaAction};
pub use store::{PgProbeStore, ProbeStore};
