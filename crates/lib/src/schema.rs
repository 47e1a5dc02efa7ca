//! # Schema Autodetection
//!
//! Infers a column type from the projected rows, the way a load job with
//! autodetect enabled would, and normalizes cell values to match it.

use crate::{constants::COLUMNS, projector::CharacterRow};
use serde_json::{Map, Value};
use std::fmt;

/// The column types the loader can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Bool,
    String,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Int64 => "INT64",
            ColumnType::Float64 => "FLOAT64",
            ColumnType::Bool => "BOOL",
            ColumnType::String => "STRING",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.column_type)
    }
}

/// Renders a schema as `name TYPE, name TYPE, ...`.
pub fn describe_schema(schema: &[Column]) -> String {
    schema
        .iter()
        .map(Column::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Infers the type of a single column. Nulls are ignored.
///
/// A column with no non-null values, or with mixed kinds, is a `STRING`.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnType {
    let mut inferred: Option<ColumnType> = None;
    for value in values {
        let kind = match value {
            Value::Null => continue,
            Value::Number(n) if n.is_i64() => ColumnType::Int64,
            Value::Number(_) => ColumnType::Float64,
            Value::Bool(_) => ColumnType::Bool,
            _ => return ColumnType::String,
        };
        inferred = Some(match (inferred, kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnType::Int64), ColumnType::Float64)
            | (Some(ColumnType::Float64), ColumnType::Int64) => ColumnType::Float64,
            _ => return ColumnType::String,
        });
    }
    inferred.unwrap_or(ColumnType::String)
}

/// Infers the schema of the output table.
pub fn infer_schema(rows: &[CharacterRow]) -> Vec<Column> {
    COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| Column {
            name: name.to_string(),
            column_type: infer_column_type(rows.iter().map(|row| row.cells()[i].1)),
        })
        .collect()
}

/// Converts a cell to the representation its column type expects.
pub fn normalize_value(value: &Value, column_type: ColumnType) -> Value {
    match (column_type, value) {
        (_, Value::Null) => Value::Null,
        (ColumnType::String, Value::String(_)) => value.clone(),
        (ColumnType::String, other) => Value::String(other.to_string()),
        _ => value.clone(),
    }
}

/// Normalizes every row against `schema`, producing one JSON object per row.
pub fn normalize_rows(rows: &[CharacterRow], schema: &[Column]) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let mut object = Map::new();
            for ((name, value), column) in row.cells().into_iter().zip(schema) {
                object.insert(name.to_string(), normalize_value(value, column.column_type));
            }
            Value::Object(object)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::project_records;
    use serde_json::json;

    #[test]
    fn test_describe_schema_lists_columns_in_order() {
        let rows = project_records(&[json!({"id": 1, "name": "Hulk", "description": ""})]);
        assert_eq!(
            describe_schema(&infer_schema(&rows)),
            "id INT64, name STRING, description STRING"
        );
    }

    #[test]
    fn test_integer_ids_infer_int64() {
        let values = [json!(1), json!(2), Value::Null];
        assert_eq!(infer_column_type(&values), ColumnType::Int64);
    }

    #[test]
    fn test_mixed_numbers_widen_to_float() {
        let values = [json!(1), json!(2.5)];
        assert_eq!(infer_column_type(&values), ColumnType::Float64);
    }

    #[test]
    fn test_fallback_literal_forces_string() {
        let values = [json!(1), json!("N/A")];
        assert_eq!(infer_column_type(&values), ColumnType::String);
    }

    #[test]
    fn test_empty_column_is_string() {
        assert_eq!(infer_column_type(std::iter::empty()), ColumnType::String);
        assert_eq!(infer_column_type(&[Value::Null]), ColumnType::String);
    }

    #[test]
    fn test_infer_schema_and_normalize() {
        let rows = project_records(&[
            json!({"id": 1, "name": "A", "description": 0}),
            json!({"id": 2, "name": "B", "description": "bio"}),
        ]);
        let schema = infer_schema(&rows);
        let types: Vec<ColumnType> = schema.iter().map(|c| c.column_type).collect();
        assert_eq!(
            types,
            vec![ColumnType::Int64, ColumnType::String, ColumnType::String]
        );

        let normalized = normalize_rows(&rows, &schema);
        assert_eq!(
            normalized[0],
            json!({"id": 1, "name": "A", "description": "0"})
        );
        assert_eq!(
            normalized[1],
            json!({"id": 2, "name": "B", "description": "bio"})
        );
    }
}
