//! Chunk repositories with atomic full-set replacement

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::document::{ChunkRepository, DocumentChunk, DocumentId};
use crate::domain::DomainError;

/// In-memory chunk repository. Replacement swaps the whole per-document
/// vector under one write lock, so readers never see a partial set.
#[derive(Debug, Default)]
pub struct InMemoryChunkRepository {
    chunks: RwLock<HashMap<String, Vec<DocumentChunk>>>,
}

impl InMemoryChunkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkRepository for InMemoryChunkRepository {
    async fn list_for_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<DocumentChunk>, DomainError> {
        let chunks = self
            .chunks
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut result = chunks.get(document_id.as_str()).cloned().unwrap_or_default();
        result.sort_by_key(|c| c.chunk_index);
        Ok(result)
    }

    async fn replace_for_document(
        &self,
        document_id: &DocumentId,
        new_chunks: Vec<DocumentChunk>,
    ) -> Result<(), DomainError> {
        let mut chunks = self
            .chunks
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        chunks.insert(document_id.as_str().to_string(), new_chunks);
        Ok(())
    }

    async fn delete_for_document(&self, document_id: &DocumentId) -> Result<(), DomainError> {
        let mut chunks = self
            .chunks
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        chunks.remove(document_id.as_str());
        Ok(())
    }
}

/// PostgreSQL chunk repository. Replacement runs delete and insert in
/// one transaction so concurrent readers never observe an empty set
/// mid-regeneration.
#[derive(Debug)]
pub struct PostgresChunkRepository {
    pool: PgPool,
}

impl PostgresChunkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = r#"
            CREATE TABLE IF NOT EXISTS document_chunks (
                key VARCHAR(255) PRIMARY KEY,
                document_id VARCHAR(255) NOT NULL,
                chunk_index BIGINT NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        let index = r#"
            CREATE INDEX IF NOT EXISTS document_chunks_document_id_idx
            ON document_chunks (document_id, chunk_index)
        "#;

        sqlx::query(index)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ChunkRepository for PostgresChunkRepository {
    async fn list_for_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<DocumentChunk>, DomainError> {
        let rows = sqlx::query(
            "SELECT data FROM document_chunks WHERE document_id = $1 ORDER BY chunk_index",
        )
        .bind(document_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list chunks: {}", e)))?;

        let mut chunks = Vec::with_capacity(rows.len());

        for row in rows {
            let data: serde_json::Value = row.get("data");
            let chunk: DocumentChunk = serde_json::from_value(data)
                .map_err(|e| DomainError::storage(format!("Failed to deserialize chunk: {}", e)))?;
            chunks.push(chunk);
        }

        Ok(chunks)
    }

    async fn replace_for_document(
        &self,
        document_id: &DocumentId,
        new_chunks: Vec<DocumentChunk>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("DELETE FROM document_chunks WHERE document_id = $1")
            .bind(document_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete chunks: {}", e)))?;

        for chunk in &new_chunks {
            let data = serde_json::to_value(chunk)
                .map_err(|e| DomainError::storage(format!("Failed to serialize chunk: {}", e)))?;

            sqlx::query(
                r#"
                INSERT INTO document_chunks (key, document_id, chunk_index, data)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(chunk.id.as_str())
            .bind(document_id.as_str())
            .bind(chunk.chunk_index as i64)
            .bind(&data)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert chunk: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn delete_for_document(&self, document_id: &DocumentId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM document_chunks WHERE document_id = $1")
            .bind(document_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete chunks: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(doc: &DocumentId, index: usize, content: &str) -> DocumentChunk {
        DocumentChunk::new(doc.clone(), index, content, vec![0.1, 0.2])
    }

    #[tokio::test]
    async fn test_replace_swaps_full_set() {
        let repo = InMemoryChunkRepository::new();
        let doc = DocumentId::new("d-1").unwrap();

        repo.replace_for_document(&doc, vec![chunk(&doc, 0, "a"), chunk(&doc, 1, "b")])
            .await
            .unwrap();
        repo.replace_for_document(&doc, vec![chunk(&doc, 0, "c")])
            .await
            .unwrap();

        let chunks = repo.list_for_document(&doc).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "c");
    }

    #[tokio::test]
    async fn test_list_orders_by_index() {
        let repo = InMemoryChunkRepository::new();
        let doc = DocumentId::new("d-1").unwrap();

        repo.replace_for_document(&doc, vec![chunk(&doc, 2, "c"), chunk(&doc, 0, "a")])
            .await
            .unwrap();

        let chunks = repo.list_for_document(&doc).await.unwrap();
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 2);
    }

    #[tokio::test]
    async fn test_delete_for_document() {
        let repo = InMemoryChunkRepository::new();
        let doc = DocumentId::new("d-1").unwrap();

        repo.replace_for_document(&doc, vec![chunk(&doc, 0, "a")])
            .await
            .unwrap();
        repo.delete_for_document(&doc).await.unwrap();

        assert!(repo.list_for_document(&doc).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_document_lists_empty() {
        let repo = InMemoryChunkRepository::new();
        let doc = DocumentId::new("d-404").unwrap();

        assert!(repo.list_for_document(&doc).await.unwrap().is_empty());
    }
}
