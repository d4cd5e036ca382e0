//! Conversation-aware agent
//!
//! Wraps an [`AnsweringEngine`]: injects prior turns into the prompt, records
//! the SQL the engine runs, and folds engine failures into the answer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::conversation::build_prompt;
use crate::agent::engine::{extract_llm_output, AnsweringEngine, EngineError};
use crate::agent::observer::{SqlLog, TracingObserver};
use crate::core::{ConversationTurn, DatachatError, Result};

/// How an answer came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    /// The engine produced a well-formed final answer
    Done,
    /// The engine's output failed to parse; the raw output is the answer
    Recovered,
    /// The engine failed; the answer text describes the failure
    Failed,
}

/// Answer to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAnswer {
    pub text: String,
    /// SQL run while answering, in execution order
    pub sql_log: Vec<String>,
    pub status: AnswerStatus,
}

impl AgentAnswer {
    pub fn is_failure(&self) -> bool {
        self.status == AnswerStatus::Failed
    }
}

/// Answers questions in the context of a conversation
pub struct ConversationAgent {
    engine: Arc<dyn AnsweringEngine>,
}

impl std::fmt::Debug for ConversationAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationAgent")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl ConversationAgent {
    pub fn new(engine: Arc<dyn AnsweringEngine>) -> Self {
        Self { engine }
    }

    /// Name of the wrapped engine
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Answer `user_input` given the turns that came before it
    ///
    /// Only empty input is an error. Engine failures come back as an answer
    /// with [`AnswerStatus::Failed`], carrying whatever SQL ran before the
    /// failure.
    pub async fn answer(
        &self,
        user_input: &str,
        history: &[ConversationTurn],
    ) -> Result<AgentAnswer> {
        if user_input.trim().is_empty() {
            return Err(DatachatError::invalid_input("question is empty"));
        }

        let prompt = build_prompt(history, user_input);
        let mut sql_log = SqlLog::new();
        let mut tracer = TracingObserver;

        let outcome = self
            .engine
            .invoke(&prompt, &mut [&mut sql_log, &mut tracer])
            .await;

        let answer = match outcome {
            Ok(text) => AgentAnswer {
                text,
                sql_log: sql_log.into_statements(),
                status: AnswerStatus::Done,
            },
            Err(EngineError::OutputParse { payload }) => {
                tracing::warn!(sql = sql_log.len(), "recovered unparseable engine output");
                AgentAnswer {
                    text: extract_llm_output(&payload),
                    sql_log: sql_log.into_statements(),
                    status: AnswerStatus::Recovered,
                }
            }
            Err(EngineError::Other(e)) => {
                tracing::warn!(error = %e, sql = sql_log.len(), "engine failed");
                AgentAnswer {
                    text: format!("Sorry, but there was an error while preparing answer: {}", e),
                    sql_log: sql_log.into_statements(),
                    status: AnswerStatus::Failed,
                }
            }
        };

        tracing::info!(
            engine = self.engine.name(),
            status = ?answer.status,
            sql = answer.sql_log.len(),
            history = history.len(),
            "answered question"
        );

        Ok(answer)
    }
}
