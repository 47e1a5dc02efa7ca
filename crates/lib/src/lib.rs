//! # Marvel Characters ETL
//!
//! This crate fetches character records from the paginated Marvel API, signing each
//! page request with a timestamped MD5 fingerprint, projects them onto a three
//! column table, and replaces a warehouse table with the result.
//!
//! The pipeline is strictly sequential. Use [`run_job`] with a [`SecretProvider`]
//! and a [`Warehouse`] to execute one run.

pub mod constants;
pub mod credentials;
pub mod errors;
pub mod fetcher;
pub mod job;
pub mod projector;
pub mod providers;
pub mod schema;
pub mod signer;

pub use credentials::{Credentials, EnvSecretProvider, SecretProvider, SecretsConfig};
pub use errors::{FetchError, JobError, JobStage, SecretError, WarehouseError};
pub use fetcher::{FetchReport, MarvelClient, StopReason};
pub use job::{run_job, JobConfig, JobOutcome, JobReport};
pub use projector::{project_records, CharacterRow};
pub use providers::warehouse::{LoadSummary, MemoryWarehouse, TableRef, Warehouse};
