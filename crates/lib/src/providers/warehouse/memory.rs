use super::{LoadSummary, TableRef, Warehouse};
use crate::{
    errors::WarehouseError,
    projector::{preview, CharacterRow},
    schema::infer_schema,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::info;

/// An in-process warehouse, used for dry runs and tests.
///
/// Clones share the same tables.
#[derive(Clone, Debug, Default)]
pub struct MemoryWarehouse {
    tables: Arc<Mutex<HashMap<TableRef, Vec<CharacterRow>>>>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the rows currently stored in `table`.
    pub fn table(&self, table: &TableRef) -> Option<Vec<CharacterRow>> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn replace_table(
        &self,
        target: &TableRef,
        rows: &[CharacterRow],
    ) -> Result<LoadSummary, WarehouseError> {
        let schema = infer_schema(rows);
        info!("Dry-run load into {target}:\n{}", preview(rows, 10));

        self.tables
            .lock()
            .map_err(|e| WarehouseError::LoadFailed(e.to_string()))?
            .insert(target.clone(), rows.to_vec());

        Ok(LoadSummary {
            table: target.to_string(),
            rows_loaded: rows.len(),
            schema,
        })
    }
}
