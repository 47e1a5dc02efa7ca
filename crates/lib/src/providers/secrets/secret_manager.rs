use crate::{
    credentials::{secret_version_name, SecretProvider},
    errors::SecretError,
};
use async_trait::async_trait;
use gcloud_sdk::{
    google::cloud::secretmanager::v1::{
        secret_manager_service_client::SecretManagerServiceClient, AccessSecretVersionRequest,
    },
    tonic, GoogleApi, GoogleAuthMiddleware,
};
use std::fmt::{self, Debug};
use tracing::debug;

const SECRET_MANAGER_URL: &str = "https://secretmanager.googleapis.com";

/// A provider that reads secrets from Google Cloud Secret Manager.
///
/// Authentication uses Application Default Credentials.
#[derive(Clone)]
pub struct SecretManagerProvider {
    client: GoogleApi<SecretManagerServiceClient<GoogleAuthMiddleware>>,
}

impl SecretManagerProvider {
    /// Creates a new `SecretManagerProvider`.
    pub async fn new() -> Result<Self, SecretError> {
        let client =
            GoogleApi::from_function(SecretManagerServiceClient::new, SECRET_MANAGER_URL, None)
                .await
                .map_err(|e| SecretError::Connection(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Debug for SecretManagerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManagerProvider")
            .field("endpoint", &SECRET_MANAGER_URL)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SecretProvider for SecretManagerProvider {
    fn name(&self) -> &str {
        "SecretManager"
    }

    async fn access_secret(
        &self,
        project_id: &str,
        secret_id: &str,
        version: &str,
    ) -> Result<String, SecretError> {
        let name = secret_version_name(project_id, secret_id, version);
        debug!("--> Accessing secret version: {name}");

        let response = self
            .client
            .get()
            .access_secret_version(tonic::Request::new(AccessSecretVersionRequest {
                name: name.clone(),
                ..Default::default()
            }))
            .await
            .map_err(|status| match status.code() {
                tonic::Code::NotFound => SecretError::NotFound(name.clone()),
                _ => SecretError::Access {
                    name: name.clone(),
                    message: status.message().to_string(),
                },
            })?;

        let payload = response
            .into_inner()
            .payload
            .ok_or_else(|| SecretError::EmptyPayload(name.clone()))?;

        String::from_utf8(payload.data.as_sensitive_bytes().to_vec())
            .map_err(|_| SecretError::Encoding(name))
    }
}
