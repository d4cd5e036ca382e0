//! Tools module - Tool implementations for the agent
//!
//! Contains the SQL tools and the tool registry.

pub mod registry;
pub mod sql;

pub use registry::{ToolRegistry, DIALECT};
