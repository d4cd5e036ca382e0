//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for the SQL toolkit: holds tool definitions in prompt order
//! and routes tool calls to their handlers.

use std::sync::Arc;

use crate::core::{ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::llm::LLMProvider;
use crate::tools::sql::{ListTablesTool, QueryCheckerTool, QueryTool, SchemaTool};
use crate::warehouse::QueryExecutor;

/// SQL dialect named in prompts
pub const DIALECT: &str = "Databricks SQL";

/// Registry of available tools
pub struct ToolRegistry {
    /// Tool definitions, in the order they are presented to the model
    definitions: Vec<ToolDefinition>,
    query_tool: QueryTool,
    schema_tool: SchemaTool,
    list_tables_tool: ListTablesTool,
    checker_tool: QueryCheckerTool,
}

impl ToolRegistry {
    /// Create the SQL toolkit over a warehouse and an LLM
    pub fn sql_toolkit(
        executor: Arc<dyn QueryExecutor>,
        llm: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        sample_rows: usize,
    ) -> Self {
        Self {
            definitions: vec![
                QueryTool::definition(),
                SchemaTool::definition(),
                ListTablesTool::definition(),
                QueryCheckerTool::definition(),
            ],
            query_tool: QueryTool::new(executor.clone()),
            schema_tool: SchemaTool::new(executor.clone(), sample_rows),
            list_tables_tool: ListTablesTool::new(executor),
            checker_tool: QueryCheckerTool::new(llm, model, DIALECT),
        }
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Look up a tool definition by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Category of a tool, if it exists
    pub fn category(&self, name: &str) -> Option<ToolCategory> {
        self.get(name).map(|d| d.category)
    }

    /// Tool names in prompt order
    pub fn tool_names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Execute a tool call
    ///
    /// Failures are reported inside the ToolResult so the model can read them.
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        let input = tool_call.input.as_str();
        match tool_call.name.as_str() {
            QueryTool::NAME => self.query_tool.execute(input).await,
            SchemaTool::NAME => self.schema_tool.execute(input).await,
            ListTablesTool::NAME => self.list_tables_tool.execute(input).await,
            QueryCheckerTool::NAME => self.checker_tool.execute(input).await,
            other => ToolResult::failure(other, format!("Unknown tool: {}", other)),
        }
    }
}
