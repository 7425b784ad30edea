//! LLM backend abstraction
//!
//! OpenRouter through its OpenAI-compatible API. Callers pass a token budget
//! and temperature per request because budgets vary wildly between a short
//! content-gap note and a full article draft.

use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;

/// LLM backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty response")]
    EmptyResponse,
}

/// Generic LLM backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion for a prompt within a token budget
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u16,
        temperature: f32,
    ) -> Result<String, LlmError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Thread-safe reference to an LLM backend
pub type SharedBackend = Arc<dyn LlmBackend>;

/// Default model when OPENROUTER_MODEL is unset
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-lite";

/// OpenRouter backend configuration
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API key (OPENROUTER_API_KEY)
    pub api_key: String,
    /// Gateway base URL
    pub base_url: String,
    /// Model name (OPENROUTER_MODEL)
    pub model: String,
}

impl OpenRouterConfig {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: model.to_string(),
        }
    }

    /// Build from environment; `None` when no key is set
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").ok()?;
        let model = std::env::var("OPENROUTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&api_key, &model))
    }
}

/// OpenRouter LLM backend
pub struct OpenRouterBackend {
    client: Client<OpenAIConfig>,
    config: OpenRouterConfig,
}

impl OpenRouterBackend {
    pub fn new(config: OpenRouterConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Config("OpenRouter API key is empty".to_string()));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            config,
        })
    }

    /// Model identifiers available on the gateway, with a static fallback
    /// when the listing call fails
    pub async fn available_models(&self) -> Vec<String> {
        match self.client.models().list().await {
            Ok(response) => response.data.into_iter().map(|m| m.id).collect(),
            Err(_) => vec![
                "google/gemini-2.5-flash-lite".to_string(),
                "anthropic/claude-3-haiku".to_string(),
                "openai/gpt-4o-mini".to_string(),
                "meta-llama/llama-3.2-3b-instruct".to_string(),
            ],
        }
    }
}

#[async_trait]
impl LlmBackend for OpenRouterBackend {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u16,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?,
        )];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(max_tokens)
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
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Create a shared OpenRouter backend
pub fn create_backend(config: OpenRouterConfig) -> Result<SharedBackend, LlmError> {
    Ok(Arc::new(OpenRouterBackend::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenRouterConfig::new("sk-or-test", DEFAULT_MODEL);
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.model, "google/gemini-2.5-flash-lite");
    }

    #[test]
    fn test_empty_key_rejected() {
        let config = OpenRouterConfig::new("", DEFAULT_MODEL);
        assert!(matches!(
            OpenRouterBackend::new(config),
            Err(LlmError::Config(_))
        ));
    }
}
