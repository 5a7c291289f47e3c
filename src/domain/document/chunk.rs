use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;

use super::DocumentId;

define_id!(
    /// Validated document chunk identifier
    DocumentChunkId,
    "DocumentChunk"
);

/// A fixed-size slice of a document's text with its own embedding.
/// Chunks are created in bulk and replaced wholesale on regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: DocumentChunkId,
    pub document_id: DocumentId,
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl DocumentChunk {
    pub fn new(
        document_id: DocumentId,
        chunk_index: usize,
        content: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: DocumentChunkId::generate(),
            document_id,
            chunk_index,
            content: content.into(),
            embedding,
            created_at: Utc::now(),
        }
    }
}

impl StorageEntity for DocumentChunk {
    type Key = DocumentChunkId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "document_chunks"
    }
}
