//! SQL agent
//!
//! The answering engine: a text-format ReAct loop
//! (Thought, Action, Action Input, Observation) over the SQL toolkit.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::engine::{AnsweringEngine, EngineResult};
use crate::agent::loop_state::{AgentLoopState, Step};
use crate::agent::observer::{ToolEvent, ToolObserver};
use crate::agent::parser::{parse_reply, AgentDecision};
use crate::core::{Config, Message, ToolCall};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::tools::{ToolRegistry, DIALECT};
use crate::warehouse::QueryExecutor;

/// Answer returned when the loop runs out of iterations
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

/// Stop sequence that keeps the model from inventing observations
const STOP_SEQUENCE: &str = "\nObservation:";

/// LLM-backed agent that answers questions by querying the warehouse
pub struct SqlAgent {
    llm: Arc<dyn LLMProvider>,
    model: String,
    tools: ToolRegistry,
    max_iterations: usize,
    top_k: usize,
    temperature: f32,
}

impl SqlAgent {
    /// Create an agent with default loop settings
    pub fn new(llm: Arc<dyn LLMProvider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            llm,
            model: model.into(),
            tools,
            max_iterations: 15,
            top_k: 10,
            temperature: 0.0,
        }
    }

    /// Create an agent and its toolkit from configuration
    pub fn from_config(
        config: &Config,
        llm: Arc<dyn LLMProvider>,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        let tools = ToolRegistry::sql_toolkit(
            executor,
            llm.clone(),
            config.gemini.model.clone(),
            config.agent.sample_rows,
        );

        Self::new(llm, config.gemini.model.clone(), tools)
            .with_max_iterations(config.agent.max_iterations)
            .with_top_k(config.agent.top_k)
            .with_temperature(config.gemini.temperature)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the full prompt for the next model call
    pub fn build_prompt(&self, question: &str, state: &AgentLoopState) -> String {
        let tool_lines: Vec<String> = self
            .tools
            .definitions()
            .iter()
            .map(|d| format!("{}: {}", d.name, d.description))
            .collect();

        format!(
            r#"You are an agent designed to interact with a SQL database.
Given an input question, create a syntactically correct {dialect} query to run, then look at the results of the query and return the answer.
Unless the user specifies a specific number of examples they wish to obtain, always limit your query to at most {top_k} results.
You can order the results by a relevant column to return the most interesting examples in the database.
Never query for all the columns from a specific table, only ask for the relevant columns given the question.
You have access to tools for interacting with the database.
Only use the below tools. Only use the information returned by the below tools to construct your final answer.
You MUST double check your query before executing it. If you get an error while executing a query, rewrite the query and try again.

DO NOT make any DML statements (INSERT, UPDATE, DELETE, DROP etc.) to the database.

If the question does not seem related to the database, just return "I don't know" as the answer.

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {question}
Thought: I should look at the tables in the database to see what I can query.  Then I should query the schema of the most relevant tables.
{scratchpad}"#,
            dialect = DIALECT,
            top_k = self.top_k,
            tools = tool_lines.join("\n"),
            tool_names = self.tools.tool_names().join(", "),
            question = question,
            scratchpad = state.scratchpad(),
        )
    }

    /// Run one tool call, notifying observers around it
    async fn run_tool(&self, call: &ToolCall, observers: &mut [&mut dyn ToolObserver]) -> String {
        let Some(category) = self.tools.category(&call.name) else {
            tracing::debug!(tool = %call.name, "model asked for an unknown tool");
            return format!(
                "{} is not a valid tool, try one of [{}].",
                call.name,
                self.tools.tool_names().join(", ")
            );
        };

        let event = ToolEvent::new(&call.name, category, &call.input);
        for observer in observers.iter_mut() {
            observer.on_tool_start(&event);
        }

        let result = self.tools.execute(call).await;
        if !result.success {
            tracing::debug!(tool = %call.name, error = %result.output, "tool failed");
        }

        for observer in observers.iter_mut() {
            observer.on_tool_end(&event, &result.output);
        }

        result.output
    }
}

#[async_trait]
impl AnsweringEngine for SqlAgent {
    async fn invoke(&self, prompt: &str, observers: &mut [&mut dyn ToolObserver]) -> EngineResult {
        let mut state = AgentLoopState::new(self.max_iterations);

        while state.should_continue() {
            tracing::debug!(
                iteration = state.iteration + 1,
                max = state.max_iterations,
                "sql agent step"
            );

            let messages = vec![Message::user(self.build_prompt(prompt, &state))];
            let options = GenerateOptions::with_temperature(self.temperature).stop_at(STOP_SEQUENCE);

            let reply = self.llm.chat(&self.model, &messages, Some(options)).await?;

            match parse_reply(&reply.content)? {
                AgentDecision::Finish { answer, .. } => {
                    state.final_answer = Some(answer);
                }
                AgentDecision::Action { call, log } => {
                    let observation = self.run_tool(&call, observers).await;
                    state.add_step(Step::new(call, log, observation));
                }
            }

            state.next_iteration();
        }

        match state.final_answer {
            Some(answer) => Ok(answer),
            None => {
                tracing::warn!(
                    steps = state.steps.len(),
                    "sql agent hit its iteration limit"
                );
                Ok(ITERATION_LIMIT_ANSWER.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "sql_agent"
    }
}
