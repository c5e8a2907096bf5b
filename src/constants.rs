//! # Probe Constants
//!
//! Names and defaults shared by the store layer, configuration and web surface.

/// Table holding one row per probe write.
pub const PROBE_TABLE: &str = "test_writes";

/// Server address reported when the backend is reached over a unix socket.
pub const LOCAL_SERVER_ADDRESS: &str = "local";

/// Prefix for environment variable overrides, e.g. `PGTESTER_POSTGRES_PASSWORD`.
pub const ENV_PREFIX: &str = "PGTESTER";

pub mod defaults {
    pub const PERIODIC_INTERVAL_SECONDS: u64 = 5;
    pub const POSTGRES_HOST: &str = "localhost";
    pub const POSTGRES_RO_HOST: &str = "localhost";
    pub const POSTGRES_PORT: u16 = 5432;
    pub const POSTGRES_DB: &str = "pgtester";
    pub const POSTGRES_USER: &str = "postgres";
    pub const POSTGRES_PASSWORD: &str = "password";
    pub const BIND_ADDRESS: &str = "0.0.0.0:8080";
    pub const OPERATION_TIMEOUT_MS: u64 = 3_000;
    pub const STOP_TIMEOUT_MS: u64 = 10_000;
    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
}

/// Store operation names used in error context and log fields.
pub mod operations {
    pub const INSERT_TIMESTAMP: &str = "insert_timestamp";
    pub const SELECT_LATEST_STATUS: &str = "select_latest_status";
    pub const TRUNCATE_ALL: &str = "truncate_all";
    pub const CONNECT: &str = "connect";
    pub const SCHEMA_EXISTS: &str = "schema_exists";
    pub const INIT_SCHEMA: &str = "init_schema";
}
