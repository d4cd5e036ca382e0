//! ReAct output parsing
//!
//! The SQL agent's model replies in the text format
//! `Thought / Action / Action Input` or `Final Answer`. Replies that fit
//! neither shape are parse failures.

use std::sync::OnceLock;

use regex::Regex;

use crate::agent::engine::EngineError;
use crate::core::{DatachatError, ToolCall};

pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

/// Reported when an action follows a final answer in the same reply
pub const ANSWER_AND_ACTION_ERROR: &str =
    "Parsing LLM output produced both a final answer and a parse-able action";

/// What the model decided to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    /// Run a tool; `log` is the model text that led to it
    Action { call: ToolCall, log: String },
    /// Stop with this answer
    Finish { answer: String, log: String },
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("action regex is valid")
    })
}

/// Parse one model reply
pub fn parse_reply(text: &str) -> Result<AgentDecision, EngineError> {
    let includes_answer = text.contains(FINAL_ANSWER_ACTION);

    if let Some(caps) = action_regex().captures(text) {
        if includes_answer {
            return answer_before_action(text, caps.get(0).map_or(0, |m| m.start()));
        }

        let tool = caps[1].trim().to_string();
        let raw_input = caps[2].trim();
        // Models sometimes run on into a fabricated observation
        let raw_input = raw_input
            .split("\nObservation")
            .next()
            .unwrap_or(raw_input)
            .trim();
        let input = raw_input
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(raw_input)
            .to_string();

        return Ok(AgentDecision::Action {
            call: ToolCall::new(tool, input),
            log: text.to_string(),
        });
    }

    if includes_answer {
        let answer = text
            .split(FINAL_ANSWER_ACTION)
            .last()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentDecision::Finish {
            answer,
            log: text.to_string(),
        });
    }

    Err(EngineError::output_parse(text))
}

/// A reply holding both a final answer and an action
///
/// An answer written before the action wins; the answer runs up to the next
/// blank line. An action written first is an engine failure, not a format
/// slip, so it is not recoverable.
fn answer_before_action(text: &str, action_start: usize) -> Result<AgentDecision, EngineError> {
    match text.find(FINAL_ANSWER_ACTION) {
        Some(idx) if idx < action_start => {
            let start = idx + FINAL_ANSWER_ACTION.len();
            let end = text[start..]
                .find("\n\n")
                .map_or(text.len(), |offset| start + offset);
            Ok(AgentDecision::Finish {
                answer: text[start..end].trim().to_string(),
                log: text[..end].to_string(),
            })
        }
        _ => Err(EngineError::Other(DatachatError::llm(format!(
            "{}: {}",
            ANSWER_AND_ACTION_ERROR, text
        )))),
    }
}
