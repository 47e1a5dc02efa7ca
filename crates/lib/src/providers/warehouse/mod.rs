#[cfg(feature = "bigquery")]
pub mod bigquery;
pub mod memory;

use crate::{errors::WarehouseError, projector::CharacterRow, schema::Column};
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::Deserialize;
use std::fmt::{self, Debug};

#[cfg(feature = "bigquery")]
pub use bigquery::BigQueryWarehouse;
pub use memory::MemoryWarehouse;

/// A fully-qualified destination table.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// What a completed load wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub table: String,
    pub rows_loaded: usize,
    pub schema: Vec<Column>,
}

/// A trait for a table sink.
///
/// Every load replaces the table's full contents, and the column types are
/// inferred from the rows. The call returns once the load has finished.
#[async_trait]
pub trait Warehouse: Send + Sync + DynClone + Debug {
    /// Returns the name of the warehouse (e.g., "BigQuery").
    fn name(&self) -> &str;

    /// Truncates `target` and writes `rows` into it.
    async fn replace_table(
        &self,
        target: &TableRef,
        rows: &[CharacterRow],
    ) -> Result<LoadSummary, WarehouseError>;
}

dyn_clone::clone_trait_object!(Warehouse);
