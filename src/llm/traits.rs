//! LLM provider abstraction
//!
//! The SQL agent only needs plain text completion with stop sequences, so the
//! trait stays small: one chat call and a model probe.

use async_trait::async_trait;

use crate::core::{Message, Result};

/// Completion returned by a provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<TokenUsage>,
    /// Model version reported by the service, or the requested model
    pub model: String,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Sampling settings for one call; `None` leaves the service default
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Generation halts before emitting any of these
    pub stop: Option<Vec<String>>,
}

impl GenerateOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    /// Add a stop sequence
    pub fn stop_at(mut self, sequence: impl Into<String>) -> Self {
        self.stop.get_or_insert_with(Vec::new).push(sequence.into());
        self
    }
}

/// A chat-completion backend
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Complete a conversation
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Whether `model` can be used with the configured credentials
    async fn is_model_available(&self, model: &str) -> Result<bool>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_sequences_accumulate() {
        let options = GenerateOptions::with_temperature(0.0)
            .stop_at("\nObservation:")
            .stop_at("\n\tObservation:");

        assert_eq!(options.temperature, Some(0.0));
        assert_eq!(options.stop.as_ref().map(Vec::len), Some(2));
        assert!(options.max_tokens.is_none());
    }
}
