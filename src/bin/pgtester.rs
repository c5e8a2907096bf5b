//! # pgtester
//!
//! Runs the primary/replica consistency probe with its HTTP status surface,
//! or prepares the probe table.
//!
//! ## Usage
//!
//! ```bash
//! # Probe and serve with defaults (config/pgtester.toml if present)
//! pgtester
//!
//! # Explicit config file, JSON logs
//! PGTESTER_LOG_FORMAT=json pgtester --config /etc/pgtester.toml serve
//!
//! # Create the probe table, dropping any existing one
//! pgtester init-db --reset
//! ```

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use pgtester::config::{ConfigManager, ProbeConfig};
use pgtester::database::{ensure_schema, PgProbeStore, ProbeStore, SchemaAction, TargetConnector};
use pgtester::error::ProbeError;
use pgtester::logging;
use pgtester::models::ReceiptClock;
use pgtester::probe::{PeriodicScheduler, ProbeCycle, StartupProbe};
use pgtester::web::{create_app, AppState};

#[derive(Parser)]
#[command(name = "pgtester", version)]
#[command(about = "PostgreSQL primary/replica liveness and consistency probe")]
struct Cli {
    /// TOML configuration file; must exist when given
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the startup probe, the periodic probe and the web server (default)
    Serve,
    /// Check for the probe table and create it if necessary
    InitDb {
        /// Drop and recreate the table even if it already exists
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_structured_logging();

    let manager =
        ConfigManager::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = Arc::new(manager.config().clone());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?manager.source_file(),
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::InitDb { reset } => init_db(&config, reset).await,
    }
}

async fn serve(config: Arc<ProbeConfig>) -> anyhow::Result<()> {
    let store: Arc<dyn ProbeStore> = Arc::new(PgProbeStore::from_config(&config));
    let clock = Arc::new(ReceiptClock::new());

    StartupProbe::new(store.clone(), clock.clone())
        .run_once()
        .await;

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    let scheduler = Arc::new(PeriodicScheduler::new(
        ProbeCycle::new(store.clone(), clock),
        config.stop_timeout(),
    ));
    scheduler
        .start(config.interval())
        .await
        .context("Failed to start periodic probe")?;

    let app = create_app(AppState::new(store, scheduler.clone(), config.clone()));

    info!(bind_address = %config.bind_address, "pgtester started, press Ctrl+C to shut down");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutdown signal received, stopping periodic probe");
    if let Err(e) = scheduler.stop().await {
        error!(error = %e, "Periodic probe did not stop cleanly");
    }

    served.context("Web server failed")?;
    info!("pgtester shutdown complete");
    Ok(())
}

async fn init_db(config: &ProbeConfig, reset: bool) -> anyhow::Result<()> {
    let connector = TargetConnector::from_config(config);

    match ensure_schema(&connector, reset).await {
        Ok(SchemaAction::Created) => {
            println!("Initialized a fresh database");
            Ok(())
        }
        Ok(SchemaAction::Retained) => {
            println!("Existing database retained");
            Ok(())
        }
        Err(e @ (ProbeError::Connection { .. } | ProbeError::Timeout { .. })) => {
            eprintln!("ERROR: Can't connect to database! Invalid/missing configuration?");
            eprintln!("---");
            eprintln!("{e}");
            eprintln!("---");
            Err(anyhow!("Can't run without a database connection"))
        }
        Err(e) => Err(e).context("Schema initialization failed"),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
