//! JSON payload → [`Table`] normalization.
//!
//! Records are flattened so that nested objects become dotted column names
//! (`quote.USD.price`). The column set is the union of every key seen across
//! all records, in first-seen order; records missing a column get `null`.
//! Arrays are kept as opaque values and never expanded.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::Table;

/// Column used for list items or payloads that are not JSON objects.
pub const SCALAR_COLUMN: &str = "value";

/// Where an endpoint puts its records inside the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// The body itself is the record list (or a single record).
    Root,
    /// The records sit under a top-level field, e.g. `data`.
    Field(&'static str),
    /// The records sit under a chain of nested fields, e.g. `data.quotes`.
    Path(&'static [&'static str]),
    /// A top-level field holds an object of records keyed by id or symbol;
    /// each value becomes one record.
    Keyed(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("malformed response: missing '{field}' field")]
    MissingField { field: String },
}

/// Selects the record payload for `shape` out of a decoded response body.
pub fn extract(body: &Value, shape: PayloadShape) -> Result<Cow<'_, Value>, NormalizeError> {
    match shape {
        PayloadShape::Root => Ok(Cow::Borrowed(body)),
        PayloadShape::Field(field) => field_at(body, &[field]).map(Cow::Borrowed),
        PayloadShape::Path(path) => field_at(body, path).map(Cow::Borrowed),
        PayloadShape::Keyed(field) => {
            let value = field_at(body, &[field])?;
            match value {
                Value::Object(entries)
                    if !entries.is_empty() && entries.values().all(Value::is_object) =>
                {
                    Ok(Cow::Owned(Value::Array(entries.values().cloned().collect())))
                }
                other => Ok(Cow::Borrowed(other)),
            }
        }
    }
}

fn field_at<'a>(body: &'a Value, path: &[&str]) -> Result<&'a Value, NormalizeError> {
    path.iter()
        .try_fold(body, |value, field| value.as_object().and_then(|object| object.get(*field)))
        .ok_or_else(|| NormalizeError::MissingField {
            field: path.join("."),
        })
}

/// Flattens a payload into a rectangular table.
pub fn normalize(payload: &Value) -> Table {
    let records: Vec<Vec<(String, Value)>> = match payload {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(flatten_record).collect(),
        other => vec![flatten_record(other)],
    };

    let mut columns = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in &records {
        for (name, _) in record {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let width = columns.len();
    let rows = records
        .into_iter()
        .map(|record| {
            let mut row = vec![Value::Null; width];
            for (name, value) in record {
                if let Some(&index) = positions.get(&name) {
                    row[index] = value;
                }
            }
            row
        })
        .collect();

    Table::from_aligned_rows(columns, rows)
}

fn flatten_record(value: &Value) -> Vec<(String, Value)> {
    let mut fields = Vec::new();
    match value {
        Value::Object(object) => flatten_object(None, object, &mut fields),
        other => fields.push((String::from(SCALAR_COLUMN), other.clone())),
    }
    fields
}

fn flatten_object(
    prefix: Option<&str>,
    object: &Map<String, Value>,
    out: &mut Vec<(String, Value)>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_object(Some(name.as_str()), nested, out);
            }
            other => out.push((name, other.clone())),
        }
    }
}
