//! Tool event observation
//!
//! Engines report every tool they run to the observers passed into
//! [`AnsweringEngine::invoke`](crate::agent::AnsweringEngine::invoke).

use crate::core::ToolCategory;

/// A tool the engine is about to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEvent {
    pub tool_name: String,
    pub category: ToolCategory,
    /// Literal input given to the tool (the SQL text for execution tools)
    pub input: String,
}

impl ToolEvent {
    pub fn new(tool_name: impl Into<String>, category: ToolCategory, input: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            category,
            input: input.into(),
        }
    }

    /// Whether this event runs SQL against the warehouse
    pub fn executes_sql(&self) -> bool {
        self.category == ToolCategory::Execution
    }
}

/// Listener for tool events within one engine invocation
pub trait ToolObserver: Send {
    /// Called before the tool runs
    fn on_tool_start(&mut self, event: &ToolEvent);

    /// Called after the tool returned its observation
    fn on_tool_end(&mut self, _event: &ToolEvent, _output: &str) {}
}

/// Collects the SQL of every execution tool event, in order
#[derive(Debug, Default, Clone)]
pub struct SqlLog {
    statements: Vec<String>,
}

impl SqlLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }
}

impl ToolObserver for SqlLog {
    fn on_tool_start(&mut self, event: &ToolEvent) {
        if event.executes_sql() {
            self.statements.push(event.input.clone());
        }
    }
}

/// Traces every tool event
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ToolObserver for TracingObserver {
    fn on_tool_start(&mut self, event: &ToolEvent) {
        tracing::debug!(tool = %event.tool_name, category = %event.category, input = %event.input, "tool start");
    }

    fn on_tool_end(&mut self, event: &ToolEvent, output: &str) {
        tracing::debug!(tool = %event.tool_name, output_len = output.len(), "tool end");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_log_keeps_only_execution_events_in_order() {
        let mut log = SqlLog::new();
        log.on_tool_start(&ToolEvent::new("sql_db_list_tables", ToolCategory::Inspection, ""));
        log.on_tool_start(&ToolEvent::new("sql_db_query", ToolCategory::Execution, "SELECT 1"));
        log.on_tool_start(&ToolEvent::new(
            "sql_db_query_checker",
            ToolCategory::Validation,
            "SELECT 2",
        ));
        log.on_tool_start(&ToolEvent::new("sql_db_query", ToolCategory::Execution, "SELECT 3"));

        assert_eq!(log.statements(), ["SELECT 1", "SELECT 3"]);
    }
}
