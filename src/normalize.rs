//! Converts remote report responses into typed row collections.
//!
//! The remote service answers with `[...]`, `{ data: [...] }`,
//! `{ data: { data: [...] } }` or a single record. [`resolve_payload`] picks
//! the shape once; [`normalize`] never fails and yields an empty collection
//! for anything it does not recognize.

use crate::model::{CellValue, DeductionStatus, FieldKind, FieldSpec, ReportKind, Row, RowCollection};
use serde_json::{Map, Value};

const DATA_KEY: &str = "data";

/// Recognized response shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    /// Top-level array or `{ data: [...] }`
    Array(&'a [Value]),
    /// A single record, bare or under `data`
    SingleObject(&'a Map<String, Value>),
    /// `{ data: { data: [...] } }`
    Nested(&'a [Value]),
    Empty,
}

pub fn resolve_payload(raw: &Value) -> Payload<'_> {
    match raw {
        Value::Array(items) => Payload::Array(items),
        Value::Object(map) => match map.get(DATA_KEY) {
            None => Payload::SingleObject(map),
            Some(Value::Array(items)) => Payload::Array(items),
            Some(Value::Object(inner)) => match inner.get(DATA_KEY) {
                None => Payload::SingleObject(inner),
                Some(Value::Array(items)) => Payload::Nested(items),
                Some(Value::Object(record)) => Payload::SingleObject(record),
                Some(_) => Payload::Empty,
            },
            Some(_) => Payload::Empty,
        },
        _ => Payload::Empty,
    }
}

/// Normalizes a raw response and applies the report's field coercion.
pub fn normalize(raw: &Value, kind: ReportKind) -> RowCollection {
    let rows: Vec<Row> = match resolve_payload(raw) {
        Payload::Array(items) | Payload::Nested(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(row_from_object)
            .collect(),
        Payload::SingleObject(record) => vec![row_from_object(record)],
        Payload::Empty => {
            tracing::debug!(report = %kind, "response shape not recognized, returning no rows");
            Vec::new()
        }
    };

    let schema = kind.schema();
    let rows = rows.into_iter().map(|row| coerce_row(row, schema)).collect();
    conform_columns(rows)
}

fn row_from_object(record: &Map<String, Value>) -> Row {
    record
        .iter()
        .map(|(key, value)| (key.as_str(), scalar_from_json(value)))
        .collect()
}

fn scalar_from_json(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Text(b.to_string()),
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
        Value::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

/// Applies the field schema of a known report kind. Fields named by the
/// schema are always present afterwards.
pub fn coerce_row(mut row: Row, schema: &[FieldSpec]) -> Row {
    for spec in schema {
        let current = row.get(spec.name).cloned().unwrap_or_default();
        let coerced = match spec.kind {
            FieldKind::Identifier => CellValue::Text(current.key_text()),
            FieldKind::Amount => CellValue::Number(current.as_number().unwrap_or(0.0)),
            FieldKind::Count => CellValue::Number(current.as_number().unwrap_or(0.0).trunc()),
            FieldKind::Status => {
                let status = DeductionStatus::parse_or_default(&current.display());
                CellValue::Text(status.to_string())
            }
            FieldKind::Text => CellValue::Text(current.display()),
        };
        row.insert(spec.name, coerced);
    }
    row
}

fn conform_columns(mut rows: Vec<Row>) -> RowCollection {
    let columns: Vec<String> = match rows.first() {
        Some(first) => first.keys().map(str::to_string).collect(),
        None => return RowCollection::new(),
    };
    for row in rows.iter_mut().skip(1) {
        for column in &columns {
            if !row.contains(column) {
                row.insert(column.clone(), CellValue::Null);
            }
        }
    }
    RowCollection::from(rows)
}
