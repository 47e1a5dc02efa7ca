//! # Application Configuration
//!
//! This module defines the configuration structure for the `marvel-etl` service and
//! the logic for loading it from an optional YAML file and environment variables.
//!
//! Layers, lowest precedence first:
//! 1. Programmatic defaults (`job.project_id` from `GOOGLE_CLOUD_PROJECT`, if set).
//! 2. The YAML file, with `${VAR}` references substituted from the environment.
//! 3. Top-level environment variables such as `PORT`.
//! 4. `MARVEL_ETL_`-prefixed variables, with `__` separating nested keys
//!    (e.g., `MARVEL_ETL_JOB__MAX_RECORDS=100`).

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use marvel_etl::JobConfig;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// The file loaded when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Where the API key pair is read from.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Google Cloud Secret Manager.
    #[default]
    SecretManager,
    /// Environment variables named after the secrets (see `EnvSecretProvider`).
    Env,
}

/// Where the projected table is written.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseKind {
    #[default]
    #[serde(rename = "bigquery")]
    BigQuery,
    /// Keeps the table in process and logs a preview. Nothing is persisted.
    Memory,
}

/// The root configuration structure.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub credential_source: CredentialSource,
    #[serde(default)]
    pub warehouse: WarehouseKind,
    /// The settings of a single job run.
    pub job: JobConfig,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    8080
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// An explicit `config_path` must exist. Without one, `config.yml` in the working
/// directory is used when present and skipped otherwise.
pub fn get_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    // Layer 1: Programmatic defaults.
    if let Ok(project_id) = env::var("GOOGLE_CLOUD_PROJECT") {
        if !project_id.is_empty() {
            builder = builder.set_default("job.project_id", project_id)?;
        }
    }

    // Layer 2: Config file.
    match config_path {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{}'.", path.display()))
            })?;
            info!("Loading configuration from '{}'.", path.display());
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if let Some(content) = read_and_substitute(path)? {
                info!("Loading configuration from '{DEFAULT_CONFIG_FILE}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            }
        }
    }

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("MARVEL_ETL")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
