//! # Paginated Fetcher
//!
//! Walks the API's `limit`/`offset` window one page at a time until the API runs
//! out of records, the cap is reached, or a request fails.

use crate::{
    constants::PAGE_SIZE, credentials::Credentials, errors::FetchError, signer::SignedQuery,
};
use reqwest::{header, Client as ReqwestClient};
use serde_json::Value;
use tracing::{debug, error, info};

/// Why the fetch loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back shorter than the page size.
    Exhausted,
    /// The accumulator reached `max_records`.
    CapReached,
    /// A request failed. Records collected before the failure are kept.
    RequestFailed(String),
}

/// The outcome of a full pagination run.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub records: Vec<Value>,
    pub pages_requested: usize,
    pub stop_reason: StopReason,
}

/// A client for the paginated characters endpoint.
#[derive(Clone, Debug)]
pub struct MarvelClient {
    client: ReqwestClient,
    base_url: String,
    credentials: Credentials,
    clock: fn() -> i64,
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl MarvelClient {
    /// Creates a new `MarvelClient`.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self, FetchError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            credentials,
            clock: unix_now,
        })
    }

    /// Replaces the timestamp source used when signing requests.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Fetches a single page and returns its `data.results` array.
    pub async fn fetch_page(&self, limit: usize, offset: usize) -> Result<Vec<Value>, FetchError> {
        let query = SignedQuery::new(&self.credentials, (self.clock)(), limit, offset);
        debug!("--> GET {} (limit={limit}, offset={offset})", self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .header(header::ACCEPT, "*/*")
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let mut body: Value = response.json().await?;
        match body
            .get_mut("data")
            .and_then(|data| data.get_mut("results"))
            .map(Value::take)
        {
            Some(Value::Array(results)) => Ok(results),
            _ => Err(FetchError::MalformedPayload { offset }),
        }
    }

    /// Collects up to `max_records` records, one page at a time.
    ///
    /// Request failures end the loop and keep what was already collected. Only a
    /// response body without a `data.results` array is returned as an error.
    pub async fn fetch_all(&self, max_records: usize) -> Result<FetchReport, FetchError> {
        let mut records: Vec<Value> = Vec::new();
        let mut offset = 0;
        let mut pages_requested = 0;

        if max_records == 0 {
            return Ok(FetchReport {
                records,
                pages_requested,
                stop_reason: StopReason::CapReached,
            });
        }

        let stop_reason = loop {
            pages_requested += 1;
            let results = match self.fetch_page(PAGE_SIZE, offset).await {
                Ok(results) => results,
                Err(e) if e.is_recoverable() => {
                    error!("An error occurred while fetching offset {offset}: {e}");
                    break StopReason::RequestFailed(e.to_string());
                }
                Err(e) => return Err(e),
            };
            let page_len = results.len();
            let remaining = max_records - records.len();

            // The cap is checked before page fullness: a short page that overflows
            // the cap is truncated without being treated as the last page.
            if page_len > remaining {
                records.extend(results.into_iter().take(remaining));
                break StopReason::CapReached;
            }
            records.extend(results);

            if page_len < PAGE_SIZE {
                break StopReason::Exhausted;
            }

            offset += PAGE_SIZE;

            if records.len() >= max_records {
                break StopReason::CapReached;
            }
        };

        info!(
            "Fetched {} records in {pages_requested} page(s), stopped: {stop_reason:?}",
            records.len()
        );

        Ok(FetchReport {
            records,
            pages_requested,
            stop_reason,
        })
    }
}
