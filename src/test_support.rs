//! Fakes shared by unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{DatachatError, Message, Result};
use crate::llm::{GenerateOptions, LLMProvider, LLMResponse};
use crate::warehouse::{Column, ColumnInfo, QueryExecutor, QueryResult};

/// LLM that replays canned replies and records the prompts it was given
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);

        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DatachatError::llm("script exhausted"))?;

        Ok(LLMResponse {
            content,
            usage: None,
            model: model.to_string(),
        })
    }

    async fn is_model_available(&self, _model: &str) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Warehouse with fixed tables; every query returns one `country` row,
/// queries mentioning `missing_table` fail
pub struct StaticWarehouse {
    tables: Vec<String>,
}

impl StaticWarehouse {
    pub fn with_table(name: &str) -> Self {
        Self {
            tables: vec![name.to_string()],
        }
    }
}

#[async_trait]
impl QueryExecutor for StaticWarehouse {
    async fn execute(&self, sql: &str) -> Result<QueryResult> {
        if sql.contains("missing_table") {
            return Err(DatachatError::warehouse("TABLE_OR_VIEW_NOT_FOUND"));
        }

        Ok(QueryResult {
            columns: vec![Column::new("country", "STRING")],
            rows: vec![vec![Some("DE".to_string())]],
            truncated: false,
        })
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.clone())
    }

    async fn describe_table(&self, _table: &str) -> Result<Vec<ColumnInfo>> {
        Ok(vec![ColumnInfo {
            name: "country".to_string(),
            data_type: "string".to_string(),
            comment: None,
        }])
    }

    fn qualify(&self, table: &str) -> String {
        format!("main.{}", table)
    }
}
