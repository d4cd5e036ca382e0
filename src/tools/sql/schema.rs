//! Schema tool
//!
//! Describes tables and shows a few sample rows of each.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::{Result, ToolCategory, ToolDefinition, ToolResult};
use crate::warehouse::QueryExecutor;

/// Tool for inspecting table schemas
pub struct SchemaTool {
    executor: Arc<dyn QueryExecutor>,
    sample_rows: usize,
}

impl SchemaTool {
    pub const NAME: &'static str = "sql_db_schema";

    /// Create a new schema tool
    pub fn new(executor: Arc<dyn QueryExecutor>, sample_rows: usize) -> Self {
        Self {
            executor,
            sample_rows,
        }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            "Input to this tool is a comma-separated list of tables, output is the schema and \
             sample rows for those tables. Be sure that the tables actually exist by calling \
             sql_db_list_tables first! Example Input: table1, table2, table3",
            ToolCategory::Inspection,
        )
    }

    /// Split the model's input into clean table names
    pub fn parse_table_names(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(|t| t.trim().trim_matches(|c: char| c == '`' || c == '"' || c == '\'').trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }

    /// Execute the tool
    pub async fn execute(&self, input: &str) -> ToolResult {
        match self.describe(input).await {
            Ok(output) => ToolResult::success(Self::NAME, output),
            Err(e) => ToolResult::failure(Self::NAME, e.to_string()),
        }
    }

    async fn describe(&self, input: &str) -> Result<String> {
        let requested = Self::parse_table_names(input);
        let known: BTreeSet<String> = self
            .executor
            .list_tables()
            .await?
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect();

        let missing: Vec<String> = requested
            .iter()
            .filter(|t| !known.contains(&t.to_lowercase()))
            .map(|t| format!("'{}'", t))
            .collect();
        if requested.is_empty() || !missing.is_empty() {
            return Ok(format!(
                "Error: table_names {{{}}} not found in database",
                missing.join(", ")
            ));
        }

        let mut sections = Vec::with_capacity(requested.len());
        for table in &requested {
            sections.push(self.describe_table(table).await?);
        }

        Ok(sections.join("\n\n"))
    }

    async fn describe_table(&self, table: &str) -> Result<String> {
        let columns = self.executor.describe_table(table).await?;

        let mut output = format!("CREATE TABLE {} (\n", table);
        let lines: Vec<String> = columns
            .iter()
            .map(|c| match c.comment {
                Some(ref comment) => format!("\t{} {} COMMENT '{}'", c.name, c.data_type, comment),
                None => format!("\t{} {}", c.name, c.data_type),
            })
            .collect();
        output.push_str(&lines.join(", \n"));
        output.push_str("\n)");

        if self.sample_rows > 0 {
            let sample = self
                .executor
                .execute(&format!(
                    "SELECT * FROM {} LIMIT {}",
                    self.executor.qualify(table),
                    self.sample_rows
                ))
                .await?;

            output.push_str(&format!(
                "\n\n/*\n{} rows from {} table:\n",
                self.sample_rows, table
            ));
            let header: Vec<&str> = sample.columns.iter().map(|c| c.name.as_str()).collect();
            output.push_str(&header.join("\t"));
            for row in &sample.rows {
                let values: Vec<&str> = row.iter().map(|v| v.as_deref().unwrap_or("None")).collect();
                output.push('\n');
                output.push_str(&values.join("\t"));
            }
            output.push_str("\n*/");
        }

        Ok(output)
    }
}
