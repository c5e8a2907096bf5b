//! Configuration Loader
//!
//! Layers defaults, an optional TOML file and `PGTESTER_*` environment
//! variables into a validated [`ProbeConfig`].

use config::{Config, Environment, File, FileFormat, Map};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::ProbeConfig;
use crate::constants::{defaults, ENV_PREFIX};
use crate::error::{ProbeError, Result};

/// Default location of the optional configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config/pgtester.toml";

pub struct ConfigManager {
    config: ProbeConfig,
    source_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from the process environment and an optional file.
    ///
    /// With no explicit path, `config/pgtester.toml` is used when present.
    pub fn load(config_file: Option<&Path>) -> Result<Arc<ConfigManager>> {
        Self::load_with_env(config_file, None)
    }

    /// Load configuration with an explicit environment map instead of the
    /// process environment. Keys are full variable names, e.g.
    /// `PGTESTER_POSTGRES_HOST`.
    pub fn load_with_env(
        config_file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Arc<ConfigManager>> {
        let source_file = config_file
            .map(Path::to_path_buf)
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()));

        let config = Self::build(source_file.as_deref(), config_file.is_some(), env)?;
        config.validate()?;

        debug!(
            config = %Self::sanitize_config_for_logging(&config),
            "Configuration resolved"
        );
        info!(
            source_file = ?source_file.as_ref().map(|p| p.display().to_string()),
            host = %config.postgres_host,
            ro_host = %config.postgres_ro_host,
            port = config.postgres_port,
            user = %config.postgres_user,
            db = %config.postgres_db,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            source_file,
        }))
    }

    /// Wrap an already-built configuration (used by tests and embedders)
    pub fn from_config(config: ProbeConfig) -> Result<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            source_file: None,
        }))
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    fn build(
        file: Option<&Path>,
        file_required: bool,
        env: Option<Map<String, String>>,
    ) -> Result<ProbeConfig> {
        let mut builder = Config::builder()
            .set_default("periodic_interval", defaults::PERIODIC_INTERVAL_SECONDS)
            .and_then(|b| b.set_default("postgres_host", defaults::POSTGRES_HOST))
            .and_then(|b| b.set_default("postgres_ro_host", defaults::POSTGRES_RO_HOST))
            .and_then(|b| b.set_default("postgres_port", i64::from(defaults::POSTGRES_PORT)))
            .and_then(|b| b.set_default("postgres_db", defaults::POSTGRES_DB))
            .and_then(|b| b.set_default("postgres_user", defaults::POSTGRES_USER))
            .and_then(|b| b.set_default("postgres_password", defaults::POSTGRES_PASSWORD))
            .and_then(|b| b.set_default("bind_address", defaults::BIND_ADDRESS))
            .and_then(|b| b.set_default("operation_timeout_ms", defaults::OPERATION_TIMEOUT_MS))
            .and_then(|b| b.set_default("stop_timeout_ms", defaults::STOP_TIMEOUT_MS))
            .and_then(|b| b.set_default("request_timeout_ms", defaults::REQUEST_TIMEOUT_MS))
            .map_err(|e| ProbeError::Configuration(e.to_string()))?;

        if let Some(path) = file {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(file_required),
            );
        }

        // Values stay strings; numeric fields are converted on deserialize
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));

        builder
            .build()
            .and_then(|c| c.try_deserialize::<ProbeConfig>())
            .map_err(|e| ProbeError::Configuration(e.to_string()))
    }

    fn sanitize_config_for_logging(config: &ProbeConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "token"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        *val = match val {
                            serde_json::Value::String(s) if s.is_empty() => {
                                serde_json::Value::String("[EMPTY]".to_string())
                            }
                            _ => serde_json::Value::String("[MASKED]".to_string()),
                        };
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}
