//! Generative text backends
//!
//! Supports OpenAI-compatible APIs and Cohere chat.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// LLM backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Empty response")]
    EmptyResponse,
}

/// Generic LLM backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion; `system` may be empty
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible backend configuration
#[derive(Debug, Clone)]
pub struct OpenAIBackendConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for OpenRouter, local servers, etc.)
    pub base_url: Option<String>,
    /// Model name
    pub model: String,
    /// Temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Max tokens
    pub max_tokens: u16,
}

impl Default for OpenAIBackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 500,
        }
    }
}

impl OpenAIBackendConfig {
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }
}

/// OpenAI-compatible LLM backend
pub struct OpenAIBackend {
    client: Client<OpenAIConfig>,
    config: OpenAIBackendConfig,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIBackendConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("OpenAI API key is empty".to_string()));
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        let client = Client::with_config(openai_config);

        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(2);

        if !system.is_empty() {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| LlmError::Api(e.to_string()))?,
            ));
        }

        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?,
        ));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build()
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Cohere chat backend configuration
#[derive(Debug, Clone)]
pub struct CohereConfig {
    /// API key
    pub api_key: String,
    /// Model name (e.g., command-r-plus)
    pub model: String,
    /// Temperature
    pub temperature: f32,
    /// API base URL
    pub base_url: String,
}

impl CohereConfig {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature: 0.2,
            base_url: "https://api.cohere.com/v1".to_string(),
        }
    }
}

/// Cohere chat backend
pub struct CohereBackend {
    client: reqwest::Client,
    config: CohereConfig,
}

impl CohereBackend {
    pub fn new(config: CohereConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("Cohere API key is empty".to_string()));
        }
        let client = reqwest::Client::new();
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmBackend for CohereBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let mut request_body = serde_json::json!({
            "model": self.config.model,
            "message": user,
            "temperature": self.config.temperature,
        });
        if !system.is_empty() {
            request_body["preamble"] = serde_json::Value::String(system.to_string());
        }

        let response = self
            .client
            .post(format!("{}/chat", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("Cohere API error {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        json["text"]
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Thread-safe reference to an LLM backend
pub type SharedBackend = Arc<dyn LlmBackend>;

/// Create a shared OpenAI-compatible backend
pub fn create_backend(config: OpenAIBackendConfig) -> Result<SharedBackend, LlmError> {
    Ok(Arc::new(OpenAIBackend::new(config)?))
}

/// Create a shared Cohere backend
pub fn create_cohere_backend(config: CohereConfig) -> Result<SharedBackend, LlmError> {
    Ok(Arc::new(CohereBackend::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_keys_are_rejected() {
        let openai = OpenAIBackend::new(OpenAIBackendConfig::openai("", "gpt-4o-mini"));
        assert!(matches!(openai, Err(LlmError::Config(_))));

        let cohere = CohereBackend::new(CohereConfig::new("  ", "command-r-plus"));
        assert!(matches!(cohere, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_default_generation_settings() {
        let config = OpenAIBackendConfig::openai("sk-test", "gpt-4o-mini");
        assert_eq!(config.max_tokens, 500);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.base_url.is_none());
    }
}
