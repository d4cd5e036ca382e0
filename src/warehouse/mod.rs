//! Warehouse module - SQL execution against the data warehouse
//!
//! The agent never talks to the warehouse directly; its tools go through the
//! [`QueryExecutor`] trait so tests can substitute an in-memory executor.

pub mod databricks;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Result;

pub use databricks::DatabricksClient;

/// A result column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Warehouse type name, e.g. `STRING`, `BIGINT`
    pub type_name: String,
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Whether values of this column render without quotes
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.base_type().as_str(),
            "TINYINT"
                | "BYTE"
                | "SMALLINT"
                | "SHORT"
                | "INT"
                | "INTEGER"
                | "BIGINT"
                | "LONG"
                | "FLOAT"
                | "DOUBLE"
                | "DECIMAL"
        )
    }

    pub fn is_boolean(&self) -> bool {
        self.base_type() == "BOOLEAN"
    }

    /// Type name without precision, e.g. `DECIMAL(10,2)` -> `DECIMAL`
    fn base_type(&self) -> String {
        self.type_name
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_uppercase()
    }
}

/// Rows returned by a statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<Column>,
    /// Values as returned by the warehouse; `None` is SQL NULL
    pub rows: Vec<Vec<Option<String>>>,
    /// The warehouse dropped rows beyond its inline result limit
    pub truncated: bool,
}

impl QueryResult {
    /// Index of a column by case-insensitive name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Values of a single column, NULLs skipped
    pub fn column_values(&self, name: &str) -> Vec<String> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(idx).cloned().flatten())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A column of a table as reported by `DESCRIBE TABLE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub comment: Option<String>,
}

/// Anything that can run SQL for the agent
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a statement and return its rows
    async fn execute(&self, sql: &str) -> Result<QueryResult>;

    /// Names of the tables in the configured schema
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns of a table in the configured schema
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Fully qualified name for a table in the configured schema
    fn qualify(&self, table: &str) -> String;

    /// Check the warehouse answers at all
    async fn ping(&self) -> Result<()> {
        self.execute("SELECT 1").await.map(|_| ())
    }
}

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_types() {
        assert!(Column::new("a", "BIGINT").is_numeric());
        assert!(Column::new("a", "decimal(10,2)").is_numeric());
        assert!(!Column::new("a", "STRING").is_numeric());
        assert!(Column::new("a", "BOOLEAN").is_boolean());
    }

    #[test]
    fn test_column_values_skip_nulls() {
        let result = QueryResult {
            columns: vec![Column::new("database", "STRING"), Column::new("tableName", "STRING")],
            rows: vec![
                vec![Some("eurostat".into()), Some("gdp".into())],
                vec![Some("eurostat".into()), None],
                vec![Some("eurostat".into()), Some("population".into())],
            ],
            truncated: false,
        };
        assert_eq!(result.column_values("tablename"), vec!["gdp", "population"]);
        assert!(result.column_values("missing").is_empty());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("gdp"), "`gdp`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
