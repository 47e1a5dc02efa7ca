//! # Job Orchestration
//!
//! A run moves through `START → CREDENTIALS_FETCHED → DATA_FETCHED → LOADED → DONE`.
//! Any failure ends the run with a `JobError` that records the last completed
//! stage. Request failures inside the fetch loop are not failures: the run
//! loads whatever was collected.

use crate::{
    constants::{DEFAULT_API_URL, DEFAULT_DATASET_ID, DEFAULT_MAX_RECORDS, DEFAULT_TABLE_ID},
    credentials::{fetch_credentials, SecretProvider, SecretsConfig},
    errors::{JobError, JobStage},
    fetcher::{MarvelClient, StopReason},
    projector::project_records,
    providers::warehouse::{TableRef, Warehouse},
    schema::{describe_schema, Column},
};
use serde::Deserialize;
use std::fmt;
use tracing::{error, info};

/// Everything a single run needs to know.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct JobConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// The project that owns the destination dataset and runs the load.
    pub project_id: String,
    #[serde(default = "default_dataset_id")]
    pub dataset_id: String,
    #[serde(default = "default_table_id")]
    pub table_id: String,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

fn default_dataset_id() -> String {
    DEFAULT_DATASET_ID.to_string()
}

fn default_table_id() -> String {
    DEFAULT_TABLE_ID.to_string()
}

impl JobConfig {
    /// A configuration with defaults for everything but the project.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            api_url: default_api_url(),
            max_records: default_max_records(),
            project_id: project_id.into(),
            dataset_id: default_dataset_id(),
            table_id: default_table_id(),
            secrets: SecretsConfig::default(),
        }
    }

    pub fn target(&self) -> TableRef {
        TableRef::new(&self.project_id, &self.dataset_id, &self.table_id)
    }
}

/// A summary of a successful run.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub table: String,
    pub records_fetched: usize,
    pub pages_requested: usize,
    pub stop_reason: StopReason,
    pub rows_loaded: usize,
    /// The column types the warehouse inferred for the load.
    pub schema: Vec<Column>,
}

/// The two outcomes reported to the invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure,
}

impl JobOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Success => "OK",
            JobOutcome::Failure => "Error",
        }
    }
}

impl<T> From<&Result<T, JobError>> for JobOutcome {
    fn from(result: &Result<T, JobError>) -> Self {
        match result {
            Ok(_) => JobOutcome::Success,
            Err(_) => JobOutcome::Failure,
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the whole pipeline once.
pub async fn run_job(
    config: &JobConfig,
    secrets: &dyn SecretProvider,
    warehouse: &dyn Warehouse,
) -> Result<JobReport, JobError> {
    let result = execute(config, secrets, warehouse).await;
    if let Err(e) = &result {
        error!("Job failed after stage {}: {e}", e.stage());
    }
    result
}

async fn execute(
    config: &JobConfig,
    secrets: &dyn SecretProvider,
    warehouse: &dyn Warehouse,
) -> Result<JobReport, JobError> {
    info!("[{}] Starting job for {}", JobStage::Start, config.target());

    // 1. Credentials
    let credentials = fetch_credentials(secrets, &config.project_id, &config.secrets)
        .await
        .map_err(JobError::Credentials)?;
    info!("[{}]", JobStage::CredentialsFetched);

    // 2. Fetch
    let client = MarvelClient::new(&config.api_url, credentials).map_err(JobError::Fetch)?;
    let report = client
        .fetch_all(config.max_records)
        .await
        .map_err(JobError::Fetch)?;
    info!(
        "[{}] {} records from {} page(s)",
        JobStage::DataFetched,
        report.records.len(),
        report.pages_requested
    );

    // 3. Project and load
    let rows = project_records(&report.records);
    let target = config.target();
    let summary = warehouse
        .replace_table(&target, &rows)
        .await
        .map_err(|source| JobError::Load {
            table: target.to_string(),
            source,
        })?;
    info!(
        "[{}] {} rows written to {} via {} ({})",
        JobStage::Loaded,
        summary.rows_loaded,
        summary.table,
        warehouse.name(),
        describe_schema(&summary.schema)
    );

    info!("[{}] Data loaded successfully into {}", JobStage::Done, summary.table);
    Ok(JobReport {
        table: summary.table,
        records_fetched: report.records.len(),
        pages_requested: report.pages_requested,
        stop_reason: report.stop_reason,
        rows_loaded: summary.rows_loaded,
        schema: summary.schema,
    })
}
