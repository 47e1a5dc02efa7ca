//! # Record Projector
//!
//! Maps raw API records onto the three columns of the output table.

use crate::constants::{COLUMNS, MISSING_VALUE, NO_DESCRIPTION};
use serde::Serialize;
use serde_json::Value;

/// One row of the output table.
///
/// `id` and `name` are passed through as whatever scalar the API returned.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CharacterRow {
    pub id: Value,
    pub name: Value,
    pub description: Value,
}

impl CharacterRow {
    /// Projects a single raw record.
    pub fn from_record(record: &Value) -> Self {
        let id = record
            .get("id")
            .cloned()
            .unwrap_or_else(|| Value::from(MISSING_VALUE));
        let name = record
            .get("name")
            .cloned()
            .unwrap_or_else(|| Value::from(MISSING_VALUE));

        let description = match record.get("description") {
            None | Some(Value::Null) => Value::from(NO_DESCRIPTION),
            Some(Value::String(s)) if s.is_empty() => Value::from(NO_DESCRIPTION),
            Some(other) => other.clone(),
        };

        Self {
            id,
            name,
            description,
        }
    }

    /// The row's cells, in column order.
    pub fn cells(&self) -> [(&'static str, &Value); 3] {
        [
            (COLUMNS[0], &self.id),
            (COLUMNS[1], &self.name),
            (COLUMNS[2], &self.description),
        ]
    }
}

/// Projects every record, preserving order.
pub fn project_records(records: &[Value]) -> Vec<CharacterRow> {
    records.iter().map(CharacterRow::from_record).collect()
}

/// Renders the first `limit` rows as a plain-text table for log output.
pub fn preview(rows: &[CharacterRow], limit: usize) -> String {
    let mut out = format!("{:>8}  {:<32}  {}\n", COLUMNS[0], COLUMNS[1], COLUMNS[2]);
    for row in rows.iter().take(limit) {
        let description = display_cell(&row.description);
        let description: String = description.chars().take(60).collect();
        out.push_str(&format!(
            "{:>8}  {:<32}  {}\n",
            display_cell(&row.id),
            display_cell(&row.name),
            description
        ));
    }
    if rows.len() > limit {
        out.push_str(&format!("... {} more rows\n", rows.len() - limit));
    }
    out.push_str(&format!("[{} rows x {} columns]", rows.len(), COLUMNS.len()));
    out
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
