//! Lazily constructed, process-wide agent handle
//!
//! Building the engine means a network round trip to both the LLM and the
//! warehouse, so it happens once, on first use. A failed build is remembered
//! and reported on every later call until [`AgentHandle::reset`].

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::agent::conversation_agent::{AgentAnswer, ConversationAgent};
use crate::agent::engine::AnsweringEngine;
use crate::agent::sql_agent::SqlAgent;
use crate::core::{Config, ConversationTurn, DatachatError, Result};
use crate::llm::{GeminiClient, LLMProvider};
use crate::warehouse::{DatabricksClient, QueryExecutor};

/// Builds the answering engine
#[async_trait]
pub trait EngineBuilder: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn AnsweringEngine>>;
}

/// Whether the agent can be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleState {
    /// No call has needed the agent yet
    NotInitialized,
    Available,
    /// Construction failed with this reason
    Unavailable(String),
}

type BuildOutcome = std::result::Result<Arc<ConversationAgent>, String>;

/// Shared, build-once access to the conversation agent
///
/// Every method takes `&self`, so one handle can sit behind an `Arc` and be
/// reset by any holder.
pub struct AgentHandle {
    builder: Arc<dyn EngineBuilder>,
    /// Swapped out wholesale on reset; the lock is never held across an await
    cell: RwLock<Arc<OnceCell<BuildOutcome>>>,
}

impl AgentHandle {
    pub fn new(builder: Arc<dyn EngineBuilder>) -> Self {
        Self {
            builder,
            cell: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    fn current(&self) -> Arc<OnceCell<BuildOutcome>> {
        self.cell
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Handle that builds the Gemini + Databricks SQL agent
    pub fn from_config(config: Config) -> Self {
        Self::new(Arc::new(SqlAgentBuilder::new(config)))
    }

    /// Get the agent, building it on first use
    ///
    /// Concurrent first callers wait on a single build.
    pub async fn get(&self) -> Result<Arc<ConversationAgent>> {
        let cell = self.current();
        let outcome = cell
            .get_or_init(|| async {
                match self.builder.build().await {
                    Ok(engine) => {
                        tracing::info!(engine = engine.name(), "agent ready");
                        Ok(Arc::new(ConversationAgent::new(engine)))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "agent construction failed");
                        Err(e.to_string())
                    }
                }
            })
            .await;

        match outcome {
            Ok(agent) => Ok(agent.clone()),
            Err(reason) => Err(DatachatError::unavailable(reason.clone())),
        }
    }

    /// Answer a question, or report that the agent is unavailable
    pub async fn ask(
        &self,
        user_input: &str,
        history: &[ConversationTurn],
    ) -> Result<AgentAnswer> {
        let agent = self.get().await?;
        agent.answer(user_input, history).await
    }

    pub fn state(&self) -> HandleState {
        match self.current().get() {
            None => HandleState::NotInitialized,
            Some(Ok(_)) => HandleState::Available,
            Some(Err(reason)) => HandleState::Unavailable(reason.clone()),
        }
    }

    /// Forget the built agent (or the failure) so the next call rebuilds
    ///
    /// Calls already holding the old agent finish with it.
    pub fn reset(&self) {
        let mut cell = self
            .cell
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cell = Arc::new(OnceCell::new());
    }
}

/// Builds a [`SqlAgent`] over Gemini and Databricks, checking both first
pub struct SqlAgentBuilder {
    config: Config,
}

impl SqlAgentBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineBuilder for SqlAgentBuilder {
    async fn build(&self) -> Result<Arc<dyn AnsweringEngine>> {
        self.config.validate()?;

        let llm: Arc<dyn LLMProvider> = Arc::new(GeminiClient::from_config(&self.config)?);
        let model = &self.config.gemini.model;
        if !llm.is_model_available(model).await? {
            return Err(DatachatError::ModelNotFound(model.clone()));
        }

        let warehouse: Arc<dyn QueryExecutor> =
            Arc::new(DatabricksClient::from_config(&self.config)?);
        warehouse.ping().await?;

        tracing::debug!(
            model = %model,
            schema = %self.config.warehouse.qualified_schema(),
            "building sql agent"
        );

        Ok(Arc::new(SqlAgent::from_config(&self.config, llm, warehouse)))
    }
}
