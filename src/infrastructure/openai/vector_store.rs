//! OpenAI vector store search provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::document::DocumentId;
use crate::domain::vector_search::{ChunkCandidate, VectorSearchProvider};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

use super::DEFAULT_OPENAI_BASE_URL;

/// Search over a hosted OpenAI vector store. Each stored chunk carries
/// the owning document id as a file attribute.
#[derive(Debug)]
pub struct OpenAiVectorSearchProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    auth_header: String,
    base_url: String,
    vector_store_id: String,
}

impl<C: HttpClientTrait> OpenAiVectorSearchProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, vector_store_id: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, vector_store_id, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        vector_store_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        Self {
            client,
            auth_header: format!("Bearer {}", api_key),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            vector_store_id: vector_store_id.into(),
        }
    }

    fn ensure_configured(&self) -> Result<(), DomainError> {
        if self.api_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "OpenAI API key is not set (APP_OPENAI__API_KEY)",
            ));
        }
        if self.vector_store_id.trim().is_empty() {
            return Err(DomainError::configuration(
                "OpenAI vector store id is not set (APP_OPENAI__VECTOR_STORE_ID)",
            ));
        }
        Ok(())
    }

    fn search_url(&self) -> String {
        format!(
            "{}/v1/vector_stores/{}/search",
            self.base_url, self.vector_store_id
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Vec<ChunkCandidate>, DomainError> {
        let response: OpenAiSearchResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse search response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .map(|result| {
                let document_id = DocumentId::new(&result.attributes.document_id)?;
                let content = result
                    .content
                    .into_iter()
                    .map(|c| c.text)
                    .collect::<Vec<_>>()
                    .join("");

                Ok(ChunkCandidate {
                    document_id,
                    content,
                    score: result.score,
                })
            })
            .collect()
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorSearchProvider for OpenAiVectorSearchProvider<C> {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ChunkCandidate>, DomainError> {
        self.ensure_configured()?;

        let url = self.search_url();
        let body = serde_json::json!({
            "query": query,
            "max_num_results": top_k,
        });

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }
}

// OpenAI API types for vector store search

#[derive(Debug, Deserialize)]
struct OpenAiSearchResponse {
    data: Vec<OpenAiSearchResult>,
}

#[derive(Debug, Deserialize)]
struct OpenAiSearchResult {
    score: f32,
    attributes: OpenAiSearchAttributes,
    #[serde(default)]
    content: Vec<OpenAiSearchContent>,
}

#[derive(Debug, Deserialize)]
struct OpenAiSearchAttributes {
    document_id: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiSearchContent {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/vector_stores/vs-1/search";

    fn search_response() -> serde_json::Value {
        serde_json::json!({
            "data": [
                {
                    "score": 0.91,
                    "attributes": { "document_id": "d-1" },
                    "content": [{ "type": "text", "text": "chunk one" }]
                },
                {
                    "score": 0.62,
                    "attributes": { "document_id": "d-2" },
                    "content": [{ "type": "text", "text": "chunk two" }]
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_search_parses_candidates() {
        let client = MockHttpClient::new().with_response(TEST_URL, search_response());
        let provider = OpenAiVectorSearchProvider::new(client, "test-key", "vs-1");

        let candidates = provider.search("query", 5).await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].document_id.as_str(), "d-1");
        assert_eq!(candidates[0].content, "chunk one");
        assert_eq!(candidates[1].score, 0.62);
    }

    #[tokio::test]
    async fn test_search_sends_top_k() {
        let client = MockHttpClient::new().with_response(TEST_URL, search_response());
        let provider = OpenAiVectorSearchProvider::new(client, "test-key", "vs-1");

        provider.search("query", 8).await.unwrap();

        let bodies = provider.client.bodies_for(TEST_URL);
        assert_eq!(bodies[0]["max_num_results"], 8);
        assert_eq!(bodies[0]["query"], "query");
    }

    #[tokio::test]
    async fn test_search_rejects_missing_api_key() {
        let provider = OpenAiVectorSearchProvider::new(MockHttpClient::new(), "", "vs-1");

        let result = provider.search("query", 5).await;
        assert!(matches!(result.unwrap_err(), DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_search_rejects_missing_vector_store_id() {
        let provider = OpenAiVectorSearchProvider::new(MockHttpClient::new(), "test-key", "");

        let result = provider.search("query", 5).await;
        assert!(matches!(result.unwrap_err(), DomainError::Configuration { .. }));
    }
}
