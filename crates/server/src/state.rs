//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The state holds the configuration and the secret
//! and warehouse providers selected by it.

use crate::config::{AppConfig, CredentialSource, WarehouseKind};
use marvel_etl::{
    providers::{
        secrets::{EnvSecretProvider, SecretManagerProvider, SecretProvider},
        warehouse::{BigQueryWarehouse, MemoryWarehouse, Warehouse},
    },
    JobConfig,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The settings of a job run.
    pub job: Arc<JobConfig>,
    /// Resolves the API key pair at the start of every run.
    pub secrets: Arc<dyn SecretProvider>,
    /// Receives the projected table at the end of every run.
    pub warehouse: Arc<dyn Warehouse>,
}

impl AppState {
    pub fn new(
        job: JobConfig,
        secrets: Arc<dyn SecretProvider>,
        warehouse: Arc<dyn Warehouse>,
    ) -> Self {
        Self {
            job: Arc::new(job),
            secrets,
            warehouse,
        }
    }
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let secrets: Arc<dyn SecretProvider> = match config.credential_source {
        CredentialSource::SecretManager => Arc::new(SecretManagerProvider::new().await?),
        CredentialSource::Env => Arc::new(EnvSecretProvider::new()),
    };

    let warehouse: Arc<dyn Warehouse> = match config.warehouse {
        WarehouseKind::BigQuery => {
            Arc::new(BigQueryWarehouse::new(config.job.project_id.clone()).await?)
        }
        WarehouseKind::Memory => Arc::new(MemoryWarehouse::new()),
    };

    info!(
        "Using {} secrets and the {} warehouse.",
        secrets.name(),
        warehouse.name()
    );

    Ok(AppState::new(config.job, secrets, warehouse))
}
