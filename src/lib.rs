//! Datachat - chat with your SQL warehouse
//!
//! A Rust chat front-end that answers natural-language questions about data
//! in a Databricks SQL warehouse, using a Gemini-backed SQL agent.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, logging, and error handling
//! - **LLM**: LLM provider abstraction with a Gemini implementation
//! - **Warehouse**: SQL execution against Databricks
//! - **Tools**: The SQL toolkit the agent can call
//! - **Agent**: The SQL agent, the conversation adapter, and the agent handle
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use datachat::agent::AgentHandle;
//! use datachat::core::{Config, ConversationTurn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = AgentHandle::from_config(Config::load());
//!     let history = vec![ConversationTurn::assistant("Hello! Ask me about the data.")];
//!
//!     let answer = handle.ask("Which country had the highest GDP?", &history).await.unwrap();
//!     println!("{}", answer.text);
//!     for sql in &answer.sql_log {
//!         println!("{}", sql);
//!     }
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;
pub mod warehouse;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use agent::{AgentAnswer, AgentHandle, ConversationAgent};
pub use cli::Repl;
pub use core::{Config, ConversationTurn, DatachatError, Result};
