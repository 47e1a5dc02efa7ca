//! # `marvel-etl-server`
//!
//! The invocation shim around the `marvel-etl` job: an HTTP handler for serverless
//! platforms and a one-shot `run` command for schedulers and local use.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

use crate::{
    config::{get_config, AppConfig},
    router::create_router,
    state::{build_app_state, AppState},
};
use anyhow::anyhow;
use clap::{Parser, Subcommand};
use marvel_etl::{run_job, JobOutcome};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{debug, info};

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML configuration file. Defaults to `./config.yml` when present.
    #[arg(long, env = "MARVEL_ETL_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Listen for HTTP invocations (the default).
    Serve,
    /// Execute a single job run and exit.
    Run,
}

// --- Server ---

/// Serves the router on `listener` until the process is stopped.
pub async fn serve(listener: TcpListener, app_state: AppState) -> anyhow::Result<()> {
    let app = create_router(app_state);
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Configures and runs the web server.
pub async fn run(listener: TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Server configuration loaded");
    let app_state = build_app_state(config).await?;
    serve(listener, app_state).await
}

/// Executes one job run in-process.
pub async fn run_once(config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Job configuration loaded");
    let app_state = build_app_state(config).await?;
    let result = run_job(
        &app_state.job,
        app_state.secrets.as_ref(),
        app_state.warehouse.as_ref(),
    )
    .await;
    let outcome = JobOutcome::from(&result);
    println!("{outcome}");

    let report = result?;
    info!(
        "{} rows loaded into {} from {} page(s).",
        report.rows_loaded, report.table, report.pages_requested
    );
    Ok(())
}

/// The library's main entry point.
///
/// Loads configuration, then dispatches to the selected command.
pub async fn start(cli: Cli) -> anyhow::Result<()> {
    let config = get_config(cli.config.as_deref())
        .map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
            let listener = TcpListener::bind(addr).await?;
            run(listener, config).await
        }
        Commands::Run => run_once(config).await,
    }
}
