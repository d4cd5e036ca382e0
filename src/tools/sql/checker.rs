//! Query checker tool
//!
//! Asks the LLM to review a query for common mistakes before it is run.

use std::sync::Arc;

use crate::core::{Message, ToolCategory, ToolDefinition, ToolResult};
use crate::llm::{GenerateOptions, LLMProvider};

/// Tool for double checking SQL with the LLM
pub struct QueryCheckerTool {
    llm: Arc<dyn LLMProvider>,
    model: String,
    dialect: String,
}

impl QueryCheckerTool {
    pub const NAME: &'static str = "sql_db_query_checker";

    pub fn new(llm: Arc<dyn LLMProvider>, model: impl Into<String>, dialect: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            dialect: dialect.into(),
        }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Use this tool to double check if your query is correct before executing it. \
             Always use this tool before executing a query with sql_db_query!",
            ToolCategory::Validation,
        )
    }

    /// Build the review prompt
    pub fn build_prompt(&self, query: &str) -> String {
        format!(
            "{}\n\
             Double check the {} query above for common mistakes, including:\n\
             - Using NOT IN with NULL values\n\
             - Using UNION when UNION ALL should have been used\n\
             - Using BETWEEN for exclusive ranges\n\
             - Data type mismatch in predicates\n\
             - Properly quoting identifiers\n\
             - Using the correct number of arguments for functions\n\
             - Casting to the correct data type\n\
             - Using the proper columns for joins\n\n\
             If there are any of the above mistakes, rewrite the query. If there are no \
             mistakes, just reproduce the original query.\n\n\
             Output the final SQL query only.\n\n\
             SQL Query: ",
            query, self.dialect
        )
    }

    /// Execute the tool
    pub async fn execute(&self, input: &str) -> ToolResult {
        let messages = vec![Message::user(self.build_prompt(input))];
        let options = GenerateOptions::with_temperature(0.0);

        match self.llm.chat(&self.model, &messages, Some(options)).await {
            Ok(response) => ToolResult::success(Self::NAME, strip_code_fence(&response.content)),
            Err(e) => ToolResult::failure(Self::NAME, e.to_string()),
        }
    }
}

/// Remove a surrounding ```sql fence, which models add despite instructions
fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    let body = match body.find('\n') {
        Some(idx) if !body[..idx].trim().contains(' ') => &body[idx + 1..],
        _ => body,
    };
    body.trim().to_string()
}
