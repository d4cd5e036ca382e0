//! Agent module - question answering and conversation management
//!
//! Contains the SQL agent that drives the LLM and tools, the conversation
//! adapter in front of it, and the lazily built handle that owns both.

pub mod conversation;
pub mod conversation_agent;
pub mod engine;
pub mod handle;
pub mod loop_state;
pub mod observer;
pub mod parser;
pub mod sql_agent;

pub use conversation::{build_prompt, render_history, Conversation, Exchange};
pub use conversation_agent::{AgentAnswer, AnswerStatus, ConversationAgent};
pub use engine::{extract_llm_output, AnsweringEngine, EngineError, EngineResult};
pub use handle::{AgentHandle, EngineBuilder, HandleState, SqlAgentBuilder};
pub use loop_state::{AgentLoopState, Step};
pub use observer::{SqlLog, ToolEvent, ToolObserver, TracingObserver};
pub use sql_agent::SqlAgent;
