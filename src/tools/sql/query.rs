//! Query tool
//!
//! Runs the model's SQL against the warehouse. This is the only tool whose
//! input ends up in an answer's SQL log.

use std::sync::Arc;

use crate::core::{ToolCategory, ToolDefinition, ToolResult};
use crate::warehouse::{Column, QueryExecutor, QueryResult};

/// Values longer than this are cut before being shown to the model
const MAX_VALUE_LEN: usize = 300;

/// Tool for running SQL queries
pub struct QueryTool {
    executor: Arc<dyn QueryExecutor>,
}

impl QueryTool {
    pub const NAME: &'static str = "sql_db_query";

    /// Create a new query tool
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Input to this tool is a detailed and correct SQL query, output is a result from \
             the database. If the query is not correct, an error message will be returned. If \
             an error is returned, rewrite the query, check the query, and try again. If you \
             encounter an issue with an unknown column, use sql_db_schema to query the correct \
             table fields.",
            ToolCategory::Execution,
        )
    }

    /// Execute the tool
    pub async fn execute(&self, input: &str) -> ToolResult {
        match self.executor.execute(input).await {
            Ok(result) => ToolResult::success(Self::NAME, format_rows(&result)),
            Err(e) => ToolResult::failure(Self::NAME, e.to_string()),
        }
    }
}

/// Render rows as a list of tuples, the shape LLMs have seen most often
///
/// Empty results render as an empty string.
pub fn format_rows(result: &QueryResult) -> String {
    if result.rows.is_empty() {
        return String::new();
    }

    let rows: Vec<String> = result
        .rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, value)| format_value(result.columns.get(i), value.as_deref()))
                .collect();
            if values.len() == 1 {
                format!("({},)", values[0])
            } else {
                format!("({})", values.join(", "))
            }
        })
        .collect();

    let mut output = format!("[{}]", rows.join(", "));
    if result.truncated {
        output.push_str("\n(result truncated by the warehouse)");
    }
    output
}

fn format_value(column: Option<&Column>, value: Option<&str>) -> String {
    let Some(value) = value else {
        return "None".to_string();
    };

    match column {
        Some(c) if c.is_numeric() => value.to_string(),
        Some(c) if c.is_boolean() => match value {
            "true" => "True".to_string(),
            "false" => "False".to_string(),
            other => other.to_string(),
        },
        _ => format!("'{}'", truncate(value).replace('\'', "\\'")),
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_LEN {
        value.to_string()
    } else {
        let cut: String = value.chars().take(MAX_VALUE_LEN).collect();
        format!("{}...", cut)
    }
}
