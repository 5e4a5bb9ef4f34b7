//! Chat-completions client
//!
//! One POST per explanation request against an OpenAI-compatible endpoint.
//! The base URL is configurable so tests can point it at a local mock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Narrative endpoint configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: constants::get_api_base(),
            api_key: constants::get_api_key(),
            model: constants::get_model_name(),
            temperature: constants::DEFAULT_TEMPERATURE,
            timeout_seconds: 30,
        }
    }
}

/// Failure causes at the narrative boundary. Variants carry rendered
/// strings so the degraded result stays cheap to clone and serialize.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum NarrativeError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("network error: {0}")]
    Network(String),

    #[error("server error: {0}")]
    Server(u16),

    #[error("malformed response: {0}")]
    Parse(String),
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug)]
pub struct ChatClient {
    config: ChatConfig,
    http_client: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, http_client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one user-role prompt, return the generated text trimmed.
    pub async fn complete(&self, prompt: &str) -> Result<String, NarrativeError> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or(NarrativeError::MissingCredential)?;

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", key))
            .json(&request)
            .send()
            .await
            .map_err(|e| NarrativeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NarrativeError::Server(response.status().as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| NarrativeError::Parse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| NarrativeError::Parse("no choices in response".to_string()))?;

        Ok(choice.message.content.trim().to_string())
    }
}
