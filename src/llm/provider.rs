use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::types::{AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// A generative model endpoint: the adapter that talks to the provider plus
/// the model name requests default to.
pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    model: String,
}

impl LLM {
    pub fn new(adapter: Box<dyn LLMAdapter>, model: impl Into<String>) -> Self {
        Self {
            adapter,
            model: model.into(),
        }
    }

    /// Gemini endpoint from configuration. A missing API key is not an error
    /// here; calls fail at request time instead.
    pub fn from_config(config: &LLMConfig) -> Self {
        let adapter =
            crate::llm::google::GoogleAdapter::with_base_url(&config.gemini_api_key, &config.gemini_api_base);
        Self::new(Box::new(adapter), config.model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
