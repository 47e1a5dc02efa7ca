use std::fmt;
use thiserror::Error;

/// Errors raised while resolving a secret from a `SecretProvider`.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),
    #[error("Failed to connect to the secret backend: {0}")]
    Connection(String),
    #[error("Failed to access secret '{name}': {message}")]
    Access { name: String, message: String },
    #[error("Secret '{0}' has no payload")]
    EmptyPayload(String),
    #[error("Secret '{0}' is not valid UTF-8")]
    Encoding(String),
}

/// Errors raised by the paginated fetcher.
///
/// Only `Transport` and `Status` are absorbed by the fetch loop. The other variants
/// escape it and fail the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Request to the API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("API response is missing the `data.results` array (offset {offset})")]
    MalformedPayload { offset: usize },
}

impl FetchError {
    /// Whether the fetch loop should stop with partial results instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status { .. })
    }
}

/// Errors raised by a `Warehouse` implementation.
#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("Failed to connect to the warehouse: {0}")]
    Connection(String),
    #[error("Load job failed: {0}")]
    LoadFailed(String),
    #[error("Load job for table {0} is still running but returned no job reference")]
    Incomplete(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[cfg(feature = "bigquery")]
    #[error("BigQuery client error: {0}")]
    BigQueryClient(#[from] gcp_bigquery_client::error::BQError),
}

/// The stages a job run moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Start,
    CredentialsFetched,
    DataFetched,
    Loaded,
    Done,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStage::Start => "START",
            JobStage::CredentialsFetched => "CREDENTIALS_FETCHED",
            JobStage::DataFetched => "DATA_FETCHED",
            JobStage::Loaded => "LOADED",
            JobStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// The typed failure of a job run.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Failed to fetch credentials: {0}")]
    Credentials(#[source] SecretError),
    #[error("Failed to fetch records: {0}")]
    Fetch(#[source] FetchError),
    #[error("Failed to load table {table}: {source}")]
    Load {
        table: String,
        #[source]
        source: WarehouseError,
    },
}

impl JobError {
    /// The last stage the run completed before failing.
    pub fn stage(&self) -> JobStage {
        match self {
            JobError::Credentials(_) => JobStage::Start,
            JobError::Fetch(_) => JobStage::CredentialsFetched,
            JobError::Load { .. } => JobStage::DataFetched,
        }
    }
}
