//! OpenAI embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

use super::DEFAULT_OPENAI_BASE_URL;

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// OpenAI embedding provider. Issues one batched call per request,
/// returning vectors in input order.
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
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
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn ensure_configured(&self) -> Result<(), DomainError> {
        if self.api_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "OpenAI API key is not set (APP_OPENAI__API_KEY)",
            ));
        }
        Ok(())
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Vec<Vec<f32>>, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        // The API may return data out of order; index restores input order
        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        self.ensure_configured()?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.embeddings_url();
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        let vectors = self.parse_response(response)?;
        if vectors.len() != texts.len() {
            return Err(DomainError::provider(
                "openai",
                format!(
                    "Expected {} embeddings, provider returned {}",
                    texts.len(),
                    vectors.len()
                ),
            ));
        }

        Ok(vectors)
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}
