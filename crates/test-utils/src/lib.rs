use async_trait::async_trait;
use marvel_etl::{
    errors::{SecretError, WarehouseError},
    providers::warehouse::{LoadSummary, TableRef, Warehouse},
    CharacterRow, SecretProvider,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The path the mocked characters endpoint is served under.
pub const CHARACTERS_PATH: &str = "/v1/public/characters";

// --- Mock Secret Provider ---

/// A secret provider backed by a fixed map of secret id to value.
#[derive(Clone, Debug, Default)]
pub struct StaticSecretProvider {
    secrets: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticSecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider holding both default Marvel key secrets.
    pub fn with_keys(public_key: &str, private_key: &str) -> Self {
        Self::new()
            .with_secret("marvel_public_key", public_key)
            .with_secret("marvel_private_key", private_key)
    }

    pub fn with_secret(mut self, secret_id: &str, value: &str) -> Self {
        self.secrets.insert(secret_id.to_string(), value.to_string());
        self
    }

    /// The resource names requested so far.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    fn name(&self) -> &str {
        "Static"
    }

    async fn access_secret(
        &self,
        project_id: &str,
        secret_id: &str,
        version: &str,
    ) -> Result<String, SecretError> {
        let name = marvel_etl::credentials::secret_version_name(project_id, secret_id, version);
        self.calls.lock().unwrap().push(name.clone());
        self.secrets
            .get(secret_id)
            .cloned()
            .ok_or(SecretError::NotFound(name))
    }
}

// --- Mock Warehouse ---

/// A warehouse that rejects every load.
#[derive(Clone, Debug, Default)]
pub struct FailingWarehouse;

#[async_trait]
impl Warehouse for FailingWarehouse {
    fn name(&self) -> &str {
        "Failing"
    }

    async fn replace_table(
        &self,
        target: &TableRef,
        _rows: &[CharacterRow],
    ) -> Result<LoadSummary, WarehouseError> {
        Err(WarehouseError::LoadFailed(format!(
            "FailingWarehouse: refusing to load {target}"
        )))
    }
}

// --- Marvel API Fixtures ---

/// Builds `count` character records with ids starting at `first_id`.
pub fn characters(first_id: u64, count: usize) -> Vec<Value> {
    (0..count as u64)
        .map(|i| {
            let id = first_id + i;
            // Odd ids get an empty description, like much of the real catalogue.
            let description = if id % 2 == 0 {
                format!("Bio of {id}")
            } else {
                String::new()
            };
            json!({
                "id": id,
                "name": format!("Character {id}"),
                "description": description,
                "modified": "2014-04-29T14:18:17-0400",
            })
        })
        .collect()
}

/// Wraps records in the API's response envelope.
pub fn page_body(results: Vec<Value>) -> Value {
    let count = results.len();
    json!({
        "code": 200,
        "status": "Ok",
        "data": {
            "limit": 100,
            "count": count,
            "results": results,
        }
    })
}

/// The full URL of the mocked characters endpoint.
pub fn characters_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), CHARACTERS_PATH)
}

/// Mounts a page of `count` records at `offset`, expected to be requested exactly once.
pub async fn mount_page(server: &MockServer, offset: usize, count: usize) {
    Mock::given(method("GET"))
        .and(path(CHARACTERS_PATH))
        .and(query_param("offset", offset.to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(characters(offset as u64, count))),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts an error status at `offset`, expected to be requested exactly once.
pub async fn mount_failure(server: &MockServer, offset: usize, status: u16) {
    Mock::given(method("GET"))
        .and(path(CHARACTERS_PATH))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(server)
        .await;
}
