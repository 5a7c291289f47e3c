//! Document domain: stored texts, their chunks, embeddings and relations

mod chunk;
mod chunker;
mod entity;
mod relation;
mod repository;

pub use chunk::{DocumentChunk, DocumentChunkId};
pub use chunker::{average_embedding, split_text_to_chunks, CHUNK_OVERLAP, CHUNK_SIZE};
pub use entity::{Document, DocumentId, DocumentMeta, DocumentOwner};
pub use relation::{DocumentRelation, DocumentRelationId, RelationScope};
pub use repository::ChunkRepository;
