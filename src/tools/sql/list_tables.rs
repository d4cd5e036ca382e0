//! List tables tool

use std::sync::Arc;

use crate::core::{ToolCategory, ToolDefinition, ToolResult};
use crate::warehouse::QueryExecutor;

/// Tool for listing the tables in the configured schema
pub struct ListTablesTool {
    executor: Arc<dyn QueryExecutor>,
}

impl ListTablesTool {
    pub const NAME: &'static str = "sql_db_list_tables";

    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Input is an empty string, output is a comma-separated list of tables in the database.",
            ToolCategory::Inspection,
        )
    }

    /// Execute the tool; the input is ignored
    pub async fn execute(&self, _input: &str) -> ToolResult {
        match self.executor.list_tables().await {
            Ok(tables) => ToolResult::success(Self::NAME, tables.join(", ")),
            Err(e) => ToolResult::failure(Self::NAME, e.to_string()),
        }
    }
}
