//! Static table catalog used to answer metadata calls without network access.

use crate::Table;

pub const TABLE_NAME_COLUMN: &str = "table_name";
pub const COLUMN_NAME_COLUMN: &str = "column_name";

/// A logical table and its ordered column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<String>,
}

impl TableSchema {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Immutable, explicitly constructed table → columns mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: Vec<TableSchema>,
}

impl SchemaCatalog {
    /// Builds a catalog. A repeated table name replaces the earlier columns but
    /// keeps the earlier position.
    pub fn new<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = TableSchema>,
    {
        let mut catalog = Self::default();
        for table in tables {
            match catalog.tables.iter_mut().find(|seen| seen.name == table.name) {
                Some(seen) => seen.columns = table.columns,
                None => catalog.tables.push(table),
            }
        }
        catalog
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(TableSchema::name)
    }

    pub fn contains(&self, table_name: &str) -> bool {
        self.tables.iter().any(|table| table.name == table_name)
    }

    /// Declared columns for `table_name`; empty for unknown tables.
    pub fn columns(&self, table_name: &str) -> &[String] {
        self.tables
            .iter()
            .find(|table| table.name == table_name)
            .map(TableSchema::columns)
            .unwrap_or(&[])
    }

    pub fn list_tables(&self) -> Table {
        Table::single_column(TABLE_NAME_COLUMN, self.table_names())
    }

    pub fn list_columns(&self, table_name: &str) -> Table {
        Table::single_column(
            COLUMN_NAME_COLUMN,
            self.columns(table_name).iter().map(String::as_str),
        )
    }
}
