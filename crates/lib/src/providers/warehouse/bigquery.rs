use super::{LoadSummary, TableRef, Warehouse};
use crate::{
    errors::WarehouseError,
    projector::CharacterRow,
    schema::{infer_schema, normalize_rows, Column, ColumnType},
};
use async_trait::async_trait;
use gcp_bigquery_client::{
    model::{
        error_proto::ErrorProto, get_query_results_parameters::GetQueryResultsParameters,
        query_parameter::QueryParameter, query_parameter_type::QueryParameterType,
        query_parameter_value::QueryParameterValue, query_request::QueryRequest,
    },
    Client,
};
use std::fmt::{self, Debug};
use tracing::{debug, info};

/// The name of the query parameter carrying the rows as a JSON array.
const ROWS_PARAMETER: &str = "rows";

/// How long each `jobs.query` / `jobs.getQueryResults` call waits server-side.
/// An unfinished job is polled again; there is no overall deadline.
const POLL_TIMEOUT_MS: i32 = 120_000;

/// A warehouse backed by Google BigQuery.
///
/// A load is a single `CREATE OR REPLACE TABLE ... AS SELECT` statement, so the
/// old contents are swapped for the new rows atomically.
#[derive(Clone)]
pub struct BigQueryWarehouse {
    client: Client,
    project_id: String,
}

impl BigQueryWarehouse {
    /// Creates a new `BigQueryWarehouse` that runs its jobs in `project_id`.
    pub async fn new(project_id: String) -> Result<Self, WarehouseError> {
        let client = Client::from_application_default_credentials()
            .await
            .map_err(|e| WarehouseError::Connection(e.to_string()))?;
        Ok(Self { client, project_id })
    }
}

impl Debug for BigQueryWarehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigQueryWarehouse")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// Builds the statement that replaces `target` with the rows bound to `@rows`.
pub fn build_replace_statement(target: &TableRef, schema: &[Column]) -> String {
    let projections = schema
        .iter()
        .map(|column| {
            let extract = format!("JSON_VALUE(r, '$.{}')", column.name);
            match column.column_type {
                ColumnType::String => format!("{extract} AS {}", column.name),
                other => format!("CAST({extract} AS {}) AS {}", other.as_sql(), column.name),
            }
        })
        .collect::<Vec<_>>()
        .join(",\n  ");

    format!(
        "CREATE OR REPLACE TABLE `{target}` AS\nSELECT\n  {projections}\nFROM UNNEST(JSON_QUERY_ARRAY(@{ROWS_PARAMETER})) AS r WITH OFFSET AS pos\nORDER BY pos"
    )
}

/// Where a load job stands after a `jobs.query` or `jobs.getQueryResults` call.
#[derive(Debug, PartialEq, Eq)]
enum LoadStatus {
    Running,
    Done,
}

/// Reads the status fields shared by both responses. Errors win over completion.
fn load_status(
    job_complete: Option<bool>,
    errors: Option<Vec<ErrorProto>>,
) -> Result<LoadStatus, WarehouseError> {
    if let Some(errors) = errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().filter_map(|e| e.message).collect();
        return Err(WarehouseError::LoadFailed(messages.join("; ")));
    }
    match job_complete {
        Some(false) => Ok(LoadStatus::Running),
        _ => Ok(LoadStatus::Done),
    }
}

fn rows_parameter(rows_json: String) -> QueryParameter {
    QueryParameter {
        name: Some(ROWS_PARAMETER.to_string()),
        parameter_type: Some(QueryParameterType {
            r#type: "STRING".to_string(),
            ..Default::default()
        }),
        parameter_value: Some(QueryParameterValue {
            value: Some(rows_json),
            ..Default::default()
        }),
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    fn name(&self) -> &str {
        "BigQuery"
    }

    async fn replace_table(
        &self,
        target: &TableRef,
        rows: &[CharacterRow],
    ) -> Result<LoadSummary, WarehouseError> {
        let schema = infer_schema(rows);
        let rows_json = serde_json::to_string(&normalize_rows(rows, &schema))?;
        let statement = build_replace_statement(target, &schema);
        info!(
            "--> Replacing BigQuery table {target} with {} rows",
            rows.len()
        );

        let response = self
            .client
            .job()
            .query(
                &self.project_id,
                QueryRequest {
                    query: statement,
                    parameter_mode: Some("NAMED".to_string()),
                    query_parameters: Some(vec![rows_parameter(rows_json)]),
                    timeout_ms: Some(POLL_TIMEOUT_MS),
                    use_legacy_sql: false,
                    ..Default::default()
                },
            )
            .await?;

        if load_status(response.job_complete, response.errors)? == LoadStatus::Running {
            let job = response
                .job_reference
                .ok_or_else(|| WarehouseError::Incomplete(target.to_string()))?;
            let job_id = job
                .job_id
                .ok_or_else(|| WarehouseError::Incomplete(target.to_string()))?;
            let project_id = job.project_id.unwrap_or_else(|| self.project_id.clone());

            loop {
                debug!("Load job {job_id} still running; polling.");
                let results = self
                    .client
                    .job()
                    .get_query_results(
                        &project_id,
                        &job_id,
                        GetQueryResultsParameters {
                            location: job.location.clone(),
                            max_results: Some(0),
                            timeout_ms: Some(POLL_TIMEOUT_MS),
                            ..Default::default()
                        },
                    )
                    .await?;
                if load_status(results.job_complete, results.errors)? == LoadStatus::Done {
                    break;
                }
            }
        }

        Ok(LoadSummary {
            table: target.to_string(),
            rows_loaded: rows.len(),
            schema,
        })
    }
}
