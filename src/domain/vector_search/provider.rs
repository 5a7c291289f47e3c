use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::document::DocumentId;
use crate::domain::DomainError;

/// A ranked chunk returned by the external vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkCandidate {
    pub document_id: DocumentId,
    pub content: String,
    pub score: f32,
}

/// External vector store search API
#[async_trait]
pub trait VectorSearchProvider: Send + Sync {
    /// Top-k candidates ranked by similarity to the query
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ChunkCandidate>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Vector search with a fixed candidate list, truncated to top_k
    pub struct MockVectorSearchProvider {
        candidates: Vec<ChunkCandidate>,
        pub queries: Mutex<Vec<(String, usize)>>,
    }

    impl MockVectorSearchProvider {
        pub fn new() -> Self {
            Self {
                candidates: Vec::new(),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn with_candidate(mut self, document_id: &str, content: &str, score: f32) -> Self {
            self.candidates.push(ChunkCandidate {
                document_id: DocumentId::new(document_id).unwrap(),
                content: content.to_string(),
                score,
            });
            self
        }
    }

    impl Default for MockVectorSearchProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl VectorSearchProvider for MockVectorSearchProvider {
        async fn search(
            &self,
            query: &str,
            top_k: usize,
        ) -> Result<Vec<ChunkCandidate>, DomainError> {
            self.queries.lock().unwrap().push((query.to_string(), top_k));
            Ok(self.candidates.iter().take(top_k).cloned().collect())
        }
    }
}
