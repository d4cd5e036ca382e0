//! Answering engine contract
//!
//! Anything that turns a prompt into a final answer while reporting its tool
//! calls can back a [`ConversationAgent`](crate::agent::ConversationAgent).

use async_trait::async_trait;
use thiserror::Error;

use crate::agent::observer::ToolObserver;
use crate::core::DatachatError;

/// Marker that opens the payload of an output parse failure
pub const PARSE_FAILURE_MARKER: &str = "Could not parse LLM output";

/// Ways an engine invocation can fail
#[derive(Error, Debug)]
pub enum EngineError {
    /// The model's final output did not match the expected format.
    /// `payload` holds the raw output between backticks.
    #[error("{payload}")]
    OutputParse { payload: String },

    /// Any other failure
    #[error(transparent)]
    Other(#[from] DatachatError),
}

impl EngineError {
    /// Build a parse failure around the raw model output
    pub fn output_parse(raw_output: &str) -> Self {
        Self::OutputParse {
            payload: format!("{}: `{}`", PARSE_FAILURE_MARKER, raw_output),
        }
    }
}

/// Result of one engine invocation
pub type EngineResult = std::result::Result<String, EngineError>;

/// An LLM-backed engine that may run tools while answering
#[async_trait]
pub trait AnsweringEngine: Send + Sync {
    /// Answer a prompt, notifying `observers` of every tool call
    async fn invoke(&self, prompt: &str, observers: &mut [&mut dyn ToolObserver]) -> EngineResult;

    /// Short name for logs and status output
    fn name(&self) -> &str;
}

/// Pull the raw model output out of a parse failure payload
///
/// Takes the text after the marker and returns what lies strictly between its
/// first and last backtick. This is a heuristic: output that itself contains
/// backticks may be cut at the wrong place. Without a backtick pair the whole
/// text after the marker is returned, trimmed.
pub fn extract_llm_output(payload: &str) -> String {
    let tail = match payload.find(PARSE_FAILURE_MARKER) {
        Some(idx) => &payload[idx + PARSE_FAILURE_MARKER.len()..],
        None => payload,
    };

    match (tail.find('`'), tail.rfind('`')) {
        (Some(start), Some(end)) if start < end => tail[start + 1..end].to_string(),
        _ => tail.trim_start_matches(':').trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_between_backticks() {
        assert_eq!(extract_llm_output("... `SELECT 1` ..."), "SELECT 1");
    }

    #[test]
    fn test_extracts_after_marker() {
        let err = EngineError::output_parse("The GDP of France was 2.8 trillion.");
        let EngineError::OutputParse { payload } = err else {
            panic!("expected parse failure");
        };
        assert_eq!(
            payload,
            "Could not parse LLM output: `The GDP of France was 2.8 trillion.`"
        );
        assert_eq!(
            extract_llm_output(&payload),
            "The GDP of France was 2.8 trillion."
        );
    }

    #[test]
    fn test_spans_first_to_last_backtick() {
        let payload = "Could not parse LLM output: `Use `gdp` table` trailing";
        assert_eq!(extract_llm_output(payload), "Use `gdp` table");
    }

    #[test]
    fn test_backticks_before_marker_ignored() {
        let payload = "`noise` Could not parse LLM output: `answer`";
        assert_eq!(extract_llm_output(payload), "answer");
    }

    #[test]
    fn test_no_backtick_pair_returns_tail() {
        assert_eq!(
            extract_llm_output("Could not parse LLM output: plain text"),
            "plain text"
        );
        assert_eq!(extract_llm_output("only ` one"), "only ` one");
    }
}
