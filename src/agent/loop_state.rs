//! Agent loop state management
//!
//! Tracks the state of the ReAct reasoning loop including the scratchpad of
//! actions taken and what each returned.

use serde::{Deserialize, Serialize};

use crate::core::ToolCall;

/// State of the agent reasoning loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Current iteration (0-indexed)
    pub iteration: usize,
    /// Maximum allowed iterations
    pub max_iterations: usize,
    /// Steps taken so far
    pub steps: Vec<Step>,
    /// Final answer if the agent has completed reasoning
    pub final_answer: Option<String>,
}

impl AgentLoopState {
    /// Create a new loop state with the given max iterations
    pub fn new(max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            steps: Vec::new(),
            final_answer: None,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        self.iteration < self.max_iterations && self.final_answer.is_none()
    }

    /// Render the steps so far for the next prompt
    ///
    /// Each step is the model's own text followed by the observation and a
    /// fresh `Thought:` for the model to continue from.
    pub fn scratchpad(&self) -> String {
        let mut output = String::new();
        for step in &self.steps {
            output.push_str(&step.log);
            output.push_str("\nObservation: ");
            output.push_str(&step.observation);
            output.push_str("\nThought: ");
        }
        output
    }

    /// Record a finished step
    pub fn add_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Increment the iteration counter
    pub fn next_iteration(&mut self) {
        self.iteration += 1;
    }
}

/// One action and its observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Tool call the model asked for
    pub call: ToolCall,
    /// Model text that produced the call
    pub log: String,
    /// What the tool returned
    pub observation: String,
}

impl Step {
    pub fn new(call: ToolCall, log: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            call,
            log: log.into(),
            observation: observation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_new() {
        let state = AgentLoopState::new(15);
        assert_eq!(state.iteration, 0);
        assert_eq!(state.max_iterations, 15);
        assert!(state.steps.is_empty());
        assert!(state.final_answer.is_none());
        assert_eq!(state.scratchpad(), "");
    }

    #[test]
    fn test_should_continue() {
        let mut state = AgentLoopState::new(2);
        assert!(state.should_continue());

        state.next_iteration();
        assert!(state.should_continue());

        state.next_iteration();
        assert!(!state.should_continue()); // Reached max iterations

        let mut state = AgentLoopState::new(2);
        state.final_answer = Some("done".to_string());
        assert!(!state.should_continue());
    }

    #[test]
    fn test_scratchpad() {
        let mut state = AgentLoopState::new(10);
        state.add_step(Step::new(
            ToolCall::new("sql_db_list_tables", ""),
            "Action: sql_db_list_tables\nAction Input: ",
            "gdp, population",
        ));

        assert_eq!(
            state.scratchpad(),
            "Action: sql_db_list_tables\nAction Input: \nObservation: gdp, population\nThought: "
        );
    }
}
