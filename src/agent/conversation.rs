//! Conversation history management
//!
//! Holds the turns of a chat session, renders them into a single prompt for
//! the agent, and archives the session as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::conversation_agent::AgentAnswer;
use crate::core::{ConversationTurn, DatachatError, Result, Role};

/// Render history as `Human:` / `AI:` lines, one per turn
pub fn render_history(history: &[ConversationTurn]) -> String {
    let mut rendered = String::new();
    for turn in history {
        let speaker = match turn.role {
            Role::User => "Human",
            Role::Assistant => "AI",
        };
        rendered.push_str(speaker);
        rendered.push_str(": ");
        rendered.push_str(&turn.content);
        rendered.push('\n');
    }
    rendered
}

/// Build the prompt for a new question
///
/// With no history the question is passed through untouched.
pub fn build_prompt(history: &[ConversationTurn], user_input: &str) -> String {
    if history.is_empty() {
        return user_input.to_string();
    }

    format!(
        "Previous conversation:\n{}\nNew question: {}",
        render_history(history),
        user_input
    )
}

/// One question and the answer it got
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: AgentAnswer,
}

/// A chat session: the turns shown to the user and the answers behind them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    /// Turns in display order
    turns: Vec<ConversationTurn>,
    /// Full answers, including their SQL logs
    exchanges: Vec<Exchange>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation that opens with an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.turns.push(ConversationTurn::assistant(greeting));
        conversation
    }

    /// Append a question and its answer
    pub fn record(&mut self, question: impl Into<String>, answer: AgentAnswer) {
        let question = question.into();
        self.turns.push(ConversationTurn::user(question.clone()));
        self.turns.push(ConversationTurn::assistant(answer.text.clone()));
        self.exchanges.push(Exchange { question, answer });
    }

    /// All turns so far
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// All exchanges so far
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// The most recent answer
    pub fn last_answer(&self) -> Option<&AgentAnswer> {
        self.exchanges.last().map(|e| &e.answer)
    }

    /// Number of SQL statements run across the session
    pub fn sql_count(&self) -> usize {
        self.exchanges.iter().map(|e| e.answer.sql_log.len()).sum()
    }

    /// Clear all history, keeping the opening greeting if there was one
    pub fn clear(&mut self) {
        let greeting = match self.turns.first() {
            Some(turn) if turn.role == Role::Assistant => Some(turn.clone()),
            _ => None,
        };
        self.turns.clear();
        self.turns.extend(greeting);
        self.exchanges.clear();
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Write the session transcript as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read a session transcript
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DatachatError::Other(format!("Failed to read session {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
