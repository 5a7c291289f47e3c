use async_trait::async_trait;

use crate::domain::DomainError;

use super::{DocumentChunk, DocumentId};

/// Chunk persistence keyed by owning document. Regeneration swaps the
/// full chunk set atomically so readers never observe a partial state.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// All chunks for a document, ordered by chunk index
    async fn list_for_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<DocumentChunk>, DomainError>;

    /// Atomically replace every chunk of a document with a new set
    async fn replace_for_document(
        &self,
        document_id: &DocumentId,
        chunks: Vec<DocumentChunk>,
    ) -> Result<(), DomainError>;

    /// Remove all chunks for a document
    async fn delete_for_document(&self, document_id: &DocumentId) -> Result<(), DomainError>;
}
