//! Chat session owned by the CLI
//!
//! Keeps the conversation, asks the shared agent handle, and archives the
//! transcript.

use std::path::{Path, PathBuf};

use crate::agent::{AgentAnswer, AgentHandle, Conversation, HandleState};
use crate::core::{Config, Result};

/// One interactive chat session
pub struct ChatSession {
    config: Config,
    handle: AgentHandle,
    conversation: Conversation,
    session_path: PathBuf,
    /// The handle was built from `config` and should follow its changes
    follows_config: bool,
}

impl ChatSession {
    /// Create a session with the production agent
    pub fn new(config: Config) -> Self {
        let handle = AgentHandle::from_config(config.clone());
        let mut session = Self::with_handle(config, handle);
        session.follows_config = true;
        session
    }

    /// Create a session over a given handle
    pub fn with_handle(config: Config, handle: AgentHandle) -> Self {
        let conversation = Conversation::with_greeting(config.agent.opening_message.clone());
        let session_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".datachat")
            .join("session.json");

        Self {
            config,
            handle,
            conversation,
            session_path,
            follows_config: false,
        }
    }

    /// Archive to a different file
    pub fn set_session_path(&mut self, path: impl Into<PathBuf>) {
        self.session_path = path.into();
    }

    /// Build the agent now rather than on the first question
    pub async fn connect(&self) -> Result<()> {
        self.handle.get().await.map(|_| ())
    }

    /// Ask a question in the context of the session so far
    ///
    /// The exchange is only recorded once an answer exists.
    pub async fn ask(&mut self, question: &str) -> Result<AgentAnswer> {
        let answer = self.handle.ask(question, self.conversation.turns()).await?;
        self.conversation.record(question, answer.clone());
        Ok(answer)
    }

    /// Drop the current agent so the next question rebuilds it,
    /// picking up any settings changed since it was built
    pub fn reconnect(&mut self) {
        if self.follows_config {
            self.handle = AgentHandle::from_config(self.config.clone());
        } else {
            self.handle.reset();
        }
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn agent_state(&self) -> HandleState {
        self.handle.state()
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Save the transcript to the session path, or to `path` if given
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let target = path.unwrap_or(&self.session_path).to_path_buf();
        self.conversation.save(&target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AnsweringEngine, EngineBuilder, EngineResult, ToolObserver};
    use crate::core::DatachatError;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Builder {
        fail: bool,
    }

    #[async_trait]
    impl EngineBuilder for Builder {
        async fn build(&self) -> Result<Arc<dyn AnsweringEngine>> {
            if self.fail {
                Err(DatachatError::config("missing settings: DATABRICKS_PAT"))
            } else {
                Ok(Arc::new(Shout))
            }
        }
    }

    struct Shout;

    #[async_trait]
    impl AnsweringEngine for Shout {
        async fn invoke(&self, prompt: &str, _observers: &mut [&mut dyn ToolObserver]) -> EngineResult {
            Ok(prompt.to_uppercase())
        }

        fn name(&self) -> &str {
            "shout"
        }
    }

    fn session(fail: bool) -> ChatSession {
        ChatSession::with_handle(
            Config::default(),
            AgentHandle::new(Arc::new(Builder { fail })),
        )
    }

    #[tokio::test]
    async fn test_ask_records_exchange_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(false);
        session.set_session_path(dir.path().join("session.json"));

        session.ask("hi").await.unwrap();
        assert_eq!(session.conversation().exchanges().len(), 1);
        assert_eq!(session.agent_state(), HandleState::Available);

        let saved = session.save(None).unwrap();
        let loaded = Conversation::load(&saved).unwrap();
        assert_eq!(loaded.turns(), session.conversation().turns());
    }

    #[tokio::test]
    async fn test_unavailable_agent_records_nothing() {
        let mut session = session(true);
        let turns_before = session.conversation().len();

        let err = session.ask("hi").await.unwrap_err();
        assert!(err.to_string().contains("DATABRICKS_PAT"));
        assert_eq!(session.conversation().len(), turns_before);
        assert!(session.conversation().exchanges().is_empty());
    }
}
