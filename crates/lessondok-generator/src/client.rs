//! Chat-completions client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint and asks for
//! a JSON object answer.

use std::time::Duration;

use lessondok_core::FieldRecord;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::prompt::{ModelSettings, PromptTemplate};
use crate::ContentGenerator;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Chat-completions request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub response_format: ResponseFormat,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    settings: ModelSettings,
    temperature: f32,
    max_tokens: u32,
    /// HTTP client
    client: Client,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a client for an endpoint, model and key
    pub fn new(settings: ModelSettings) -> Self {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            settings,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
            timeout,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the request body for a lesson summary
    pub fn build_request(&self, context: &FieldRecord, prompt: &PromptTemplate) -> Result<ChatRequest> {
        let mut messages: Vec<ChatMessage> = prompt
            .system_messages()
            .into_iter()
            .map(ChatMessage::system)
            .collect();
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: serde_json::to_string(context)?,
        });

        Ok(ChatRequest {
            model: self.settings.model.clone(),
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        })
    }
}

impl ContentGenerator for OpenAiClient {
    fn generate(&self, context: &FieldRecord, prompt: &PromptTemplate) -> Result<String> {
        let request = self.build_request(context, prompt)?;
        debug!(endpoint = %self.settings.endpoint, model = %request.model, "sending chat request");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeneratorError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json()?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GeneratorError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
