//! Google Gemini client implementation
//!
//! Async HTTP client for the Gemini `generateContent` REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Config, DatachatError, Message, Result};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// A content block with a role and text parts
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Gemini generation options
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.gemini.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.gemini.base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini.api_key.clone(),
        })
    }

    /// Create a client with custom base URL
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build the request body, lifting system messages into the system instruction
    fn build_request(messages: &[Message], options: Option<&GenerateOptions>) -> GenerateRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in messages {
            let part = Part {
                text: Some(msg.content.clone()),
            };
            match msg.role.as_str() {
                "system" => system_parts.push(part),
                "assistant" => contents.push(Content {
                    role: Some("model".to_string()),
                    parts: vec![part],
                }),
                _ => contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![part],
                }),
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system_parts,
            })
        };

        let generation_config = options.map(|opts| GenerationConfig {
            temperature: opts.temperature,
            max_output_tokens: opts.max_tokens,
            stop_sequences: opts.stop.clone(),
        });

        GenerateRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Convert a Gemini response to LLMResponse
    fn to_llm_response(model: &str, response: GenerateResponse) -> Result<LLMResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DatachatError::llm("No candidates in Gemini response"))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(DatachatError::llm("Gemini blocked the response for safety"));
        }

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(LLMResponse {
            content,
            usage,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model.trim_start_matches("models/"))
    }
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = Self::build_request(messages, options.as_ref());

        tracing::debug!(model, messages = messages.len(), "Gemini generateContent");

        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url(model)))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    DatachatError::llm(format!("Cannot connect to Gemini at {}", self.base_url))
                } else {
                    DatachatError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DatachatError::llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let data: GenerateResponse = response.json().await?;
        let result = Self::to_llm_response(model, data)?;

        if let Some(ref usage) = result.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Gemini usage"
            );
        }

        Ok(result)
    }

    async fn is_model_available(&self, model: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.model_url(model))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(DatachatError::llm(format!(
                    "Gemini API error ({}): {}",
                    status, error_text
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_become_instruction() {
        let messages = vec![
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
        ];
        let request = GeminiClient::build_request(&messages, None);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_stop_sequences_mapped() {
        let options = GenerateOptions {
            temperature: Some(0.0),
            stop: Some(vec!["\nObservation:".to_string()]),
            ..Default::default()
        };
        let request = GeminiClient::build_request(&[Message::user("q")], Some(&options));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["generationConfig"]["stopSequences"][0], "\nObservation:");
        assert!(json["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_response_joins_text_parts() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Thought: "}, {"text": "done"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        });
        let data: GenerateResponse = serde_json::from_value(raw).unwrap();
        let response = GeminiClient::to_llm_response("gemini-2.5-flash", data).unwrap();

        assert_eq!(response.content, "Thought: done");
        assert_eq!(response.model, "gemini-2.5-flash");
        assert_eq!(response.usage.unwrap().total_tokens, 5);
    }

    #[test]
    fn test_empty_candidates_is_error() {
        let data: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(GeminiClient::to_llm_response("m", data).is_err());
    }
}
