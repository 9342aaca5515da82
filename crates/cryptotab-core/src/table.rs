//! Tabular results and the two-variant handler response.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ValidationError;

/// Rectangular result: ordered column names plus rows aligned to them.
///
/// Every row holds exactly `columns.len()` values; missing data is `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// One-column table, one row per value.
    pub fn single_column<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            columns: vec![name.into()],
            rows: values.into_iter().map(|value| vec![value.into()]).collect(),
        }
    }

    /// Caller guarantees every row is `columns.len()` wide.
    pub(crate) fn from_aligned_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ValidationError> {
        if row.len() != self.columns.len() {
            return Err(ValidationError::RowWidthMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|values| values.get(index))
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Rows viewed as column-name → value mappings, in column order.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }
}

/// Outcome of a handler operation: a table or an error message, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResponse {
    Table(Table),
    Error { error_message: String },
}

impl QueryResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error_message: message.into(),
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Error { .. } => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Table(_) => None,
            Self::Error { error_message } => Some(error_message),
        }
    }
}

impl From<Table> for QueryResponse {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

/// Result of a connect or health-check call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ConnectionStatus {
    pub const fn connected() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            success: false,
            error_message: Some(if reason.trim().is_empty() {
                String::from("connection check failed")
            } else {
                reason
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut table = Table::new(vec![String::from("id"), String::from("symbol")]);
        table.push_row(vec![json!(1), json!("BTC")]).expect("matching width");

        let err = table.push_row(vec![json!(2)]).expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::RowWidthMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn records_pair_columns_with_values() {
        let mut table = Table::new(vec![String::from("id"), String::from("symbol")]);
        table.push_row(vec![json!(1), Value::Null]).expect("valid row");

        let records = table.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("id"), Some(&json!(1)));
        assert_eq!(records[0].get("symbol"), Some(&Value::Null));
        assert_eq!(
            records[0].keys().collect::<Vec<_>>(),
            vec!["id", "symbol"]
        );
    }

    #[test]
    fn single_column_builds_one_row_per_value() {
        let table = Table::single_column("table_name", ["listings", "quotes"]);
        assert_eq!(table.columns(), ["table_name"]);
        assert_eq!(table.value(1, "table_name"), Some(&json!("quotes")));
        assert_eq!(table.value(2, "table_name"), None);
        assert_eq!(table.value(0, "missing"), None);
    }

    #[test]
    fn response_serializes_with_type_tag() {
        let error = serde_json::to_value(QueryResponse::error("Unsupported query type"))
            .expect("serializes");
        assert_eq!(
            error,
            json!({ "type": "error", "error_message": "Unsupported query type" })
        );

        let table = serde_json::to_value(QueryResponse::from(Table::single_column("a", [1])))
            .expect("serializes");
        assert_eq!(
            table,
            json!({ "type": "table", "columns": ["a"], "rows": [[1]] })
        );
    }

    #[test]
    fn failed_status_always_carries_a_reason() {
        let status = ConnectionStatus::failed("  ");
        assert!(!status.success);
        assert!(!status.error_message.as_deref().unwrap_or_default().is_empty());
    }
}
