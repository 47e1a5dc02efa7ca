//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port, wired to a mocked Marvel API,
//! a caller-supplied secret provider and an in-memory warehouse.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use marvel_etl::{providers::secrets::SecretProvider, JobConfig, MemoryWarehouse};
use marvel_etl_server::{serve, state::AppState};
use marvel_etl_test_utils::characters_url;
use reqwest::Client;
use std::sync::Arc;
use tokio::{net::TcpListener, task::JoinHandle};
use wiremock::MockServer;

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub warehouse: MemoryWarehouse,
    pub job: JobConfig,
    _server_handle: JoinHandle<()>,
}

impl TestApp {
    /// Spawns the application server with the given secret provider.
    pub async fn spawn(secrets: Arc<dyn SecretProvider>) -> Result<Self> {
        let mock_server = MockServer::start().await;
        let warehouse = MemoryWarehouse::new();
        let job = JobConfig {
            api_url: characters_url(&mock_server),
            ..JobConfig::new("server-test-project")
        };

        let app_state = AppState::new(job.clone(), secrets, Arc::new(warehouse.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = format!("http://{}", listener.local_addr()?);

        let server_handle = tokio::spawn(async move {
            if let Err(e) = serve(listener, app_state).await {
                eprintln!("Server error: {e}");
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            warehouse,
            job,
            _server_handle: server_handle,
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}
