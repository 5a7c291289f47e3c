//! OpenAI chat completion provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::llm::{ChatProvider, ChatRequest, ChatResponse};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

use super::DEFAULT_OPENAI_BASE_URL;

/// OpenAI chat completion provider
#[derive(Debug)]
pub struct OpenAiChatProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiChatProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        Self {
            client,
            auth_header: format!("Bearer {}", api_key),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn ensure_configured(&self) -> Result<(), DomainError> {
        if self.api_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "OpenAI API key is not set (APP_OPENAI__API_KEY)",
            ));
        }
        Ok(())
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &ChatRequest) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse, DomainError> {
        let response: OpenAiChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse chat response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "Chat response had no choices"))?;

        Ok(ChatResponse {
            content: choice.message.content,
            model: response.model,
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatProvider for OpenAiChatProvider<C> {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, DomainError> {
        self.ensure_configured()?;

        let url = self.completions_url();
        let body = self.build_request(&request);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }
}

// OpenAI API types for chat completions

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: String,
}
