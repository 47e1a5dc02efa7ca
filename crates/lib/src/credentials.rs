//! # Credentials
//!
//! The API key pair is resolved once per run through a `SecretProvider` and then
//! passed explicitly to the fetcher. It is never stored outside the run.

use crate::{constants::DEFAULT_SECRET_VERSION, errors::SecretError};
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::Deserialize;
use std::fmt::{self, Debug};
use tracing::info;

/// The public/private key pair used to sign API requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    public_key: String,
    private_key: String,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Where the key pair lives in the secret backend.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SecretsConfig {
    /// The project holding the secrets. Falls back to the job's project when unset.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_public_key_secret")]
    pub public_key_secret: String,
    #[serde(default = "default_private_key_secret")]
    pub private_key_secret: String,
    #[serde(default = "default_secret_version")]
    pub version: String,
}

fn default_public_key_secret() -> String {
    crate::constants::DEFAULT_PUBLIC_KEY_SECRET.to_string()
}

fn default_private_key_secret() -> String {
    crate::constants::DEFAULT_PRIVATE_KEY_SECRET.to_string()
}

fn default_secret_version() -> String {
    DEFAULT_SECRET_VERSION.to_string()
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            public_key_secret: default_public_key_secret(),
            private_key_secret: default_private_key_secret(),
            version: default_secret_version(),
        }
    }
}

/// A trait for looking up secret strings.
#[async_trait]
pub trait SecretProvider: Send + Sync + DynClone + Debug {
    /// Returns the name of the secret backend (e.g., "SecretManager").
    fn name(&self) -> &str;

    /// Resolves a single secret version to its string payload.
    async fn access_secret(
        &self,
        project_id: &str,
        secret_id: &str,
        version: &str,
    ) -> Result<String, SecretError>;
}

dyn_clone::clone_trait_object!(SecretProvider);

/// Builds the fully-qualified resource name of a secret version.
pub fn secret_version_name(project_id: &str, secret_id: &str, version: &str) -> String {
    format!("projects/{project_id}/secrets/{secret_id}/versions/{version}")
}

/// Resolves both halves of the key pair.
pub async fn fetch_credentials(
    provider: &dyn SecretProvider,
    default_project_id: &str,
    config: &SecretsConfig,
) -> Result<Credentials, SecretError> {
    let project_id = config.project_id.as_deref().unwrap_or(default_project_id);
    info!(
        "Resolving API credentials from {} (project '{project_id}').",
        provider.name()
    );

    let public_key = provider
        .access_secret(project_id, &config.public_key_secret, &config.version)
        .await?;
    let private_key = provider
        .access_secret(project_id, &config.private_key_secret, &config.version)
        .await?;

    Ok(Credentials::new(public_key, private_key))
}

/// Reads secrets from environment variables, for local runs.
///
/// A secret id maps to the upper-cased variable name, so `marvel_public_key`
/// is read from `MARVEL_PUBLIC_KEY`. Project and version are ignored.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn variable_name(secret_id: &str) -> String {
        secret_id.to_ascii_uppercase().replace('-', "_")
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "Environment"
    }

    async fn access_secret(
        &self,
        _project_id: &str,
        secret_id: &str,
        _version: &str,
    ) -> Result<String, SecretError> {
        let var = Self::variable_name(secret_id);
        match std::env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) => Err(SecretError::EmptyPayload(var)),
            Err(std::env::VarError::NotPresent) => Err(SecretError::NotFound(var)),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::Encoding(var)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_private_key() {
        let credentials = Credentials::new("public-123", "very-secret");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("public-123"));
        assert!(!rendered.contains("very-secret"));
    }

    #[test]
    fn test_secret_version_name() {
        assert_eq!(
            secret_version_name("proj", "marvel_public_key", "latest"),
            "projects/proj/secrets/marvel_public_key/versions/latest"
        );
    }

    #[test]
    fn test_env_variable_name() {
        assert_eq!(
            EnvSecretProvider::variable_name("marvel-private_key"),
            "MARVEL_PRIVATE_KEY"
        );
    }

    #[tokio::test]
    async fn test_env_provider_reads_and_reports_missing() {
        std::env::set_var("MARVEL_ETL_UNIT_TEST_SECRET", "value-1");
        let provider = EnvSecretProvider::new();

        let value = provider
            .access_secret("p", "marvel_etl_unit_test_secret", "latest")
            .await
            .unwrap();
        assert_eq!(value, "value-1");

        let missing = provider
            .access_secret("p", "marvel_etl_unit_test_absent", "latest")
            .await;
        assert!(matches!(missing, Err(SecretError::NotFound(_))));
    }
}
