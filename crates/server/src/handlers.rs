//! # Route Handlers

use crate::{errors::AppError, state::AppState};
use axum::extract::State;
use marvel_etl::{run_job, JobOutcome};
use tracing::info;

/// Runs the job once. The request itself is ignored.
pub async fn run_job_handler(State(app_state): State<AppState>) -> Result<&'static str, AppError> {
    info!("Received job invocation.");
    let report = run_job(
        &app_state.job,
        app_state.secrets.as_ref(),
        app_state.warehouse.as_ref(),
    )
    .await?;
    info!(
        "Job finished: {} rows loaded into {} ({:?}).",
        report.rows_loaded, report.table, report.stop_reason
    );
    Ok(JobOutcome::Success.as_str())
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "healthy"
}
