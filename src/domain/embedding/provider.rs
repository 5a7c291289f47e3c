use async_trait::async_trait;

use crate::domain::DomainError;

/// External embeddings API: one batched call, one vector per input,
/// order preserved. Failures propagate, there is no retry.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Convenience for a single input
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let mut vectors = self.embed(std::slice::from_ref(&text.to_string())).await?;
        vectors
            .pop()
            .ok_or_else(|| DomainError::provider("embedding", "provider returned no vectors"))
    }
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Deterministic embedding provider for tests: each vector encodes
    /// the input's character count so assertions can tell inputs apart.
    pub struct MockEmbeddingProvider {
        fail_with: Mutex<Option<DomainError>>,
        pub calls: Mutex<Vec<Vec<String>>>,
    }

    impl MockEmbeddingProvider {
        pub fn new() -> Self {
            Self {
                fail_with: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_error(self, error: DomainError) -> Self {
            *self.fail_with.lock().unwrap() = Some(error);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Default for MockEmbeddingProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
            self.calls.lock().unwrap().push(texts.to_vec());

            if let Some(error) = self.fail_with.lock().unwrap().take() {
                return Err(error);
            }

            Ok(texts
                .iter()
                .map(|t| vec![t.chars().count() as f32, 1.0, 0.0])
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockEmbeddingProvider;
    use super::*;

    #[tokio::test]
    async fn test_mock_preserves_order_and_count() {
        let provider = MockEmbeddingProvider::new();
        let texts = vec!["ab".to_string(), "abcd".to_string()];

        let vectors = provider.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0][0], 2.0);
        assert_eq!(vectors[1][0], 4.0);
    }

    #[tokio::test]
    async fn test_embed_one() {
        let provider = MockEmbeddingProvider::new();
        let vector = provider.embed_one("abc").await.unwrap();
        assert_eq!(vector[0], 3.0);
    }
}
