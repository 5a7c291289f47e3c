//! Document service - storage plus the chunk and embedding pipeline

use std::sync::Arc;

use tracing::info;

use crate::domain::agent::AgentId;
use crate::domain::brand::BrandId;
use crate::domain::document::{
    average_embedding, split_text_to_chunks, ChunkRepository, Document, DocumentChunk, DocumentId,
    DocumentMeta, DocumentOwner, DocumentRelation, DocumentRelationId, RelationScope,
    CHUNK_OVERLAP, CHUNK_SIZE,
};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::storage::Storage;
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Owner reference carried by create requests before ID validation
#[derive(Debug, Clone)]
pub enum OwnerRef {
    Team(String),
    Brand(String),
    Agent(String),
}

impl OwnerRef {
    fn resolve(self) -> Result<DocumentOwner, DomainError> {
        Ok(match self {
            Self::Team(id) => DocumentOwner::Team(TeamId::new(id)?),
            Self::Brand(id) => DocumentOwner::Brand(BrandId::new(id)?),
            Self::Agent(id) => DocumentOwner::Agent(AgentId::new(id)?),
        })
    }

    fn resolve_scope(self) -> Result<RelationScope, DomainError> {
        Ok(match self {
            Self::Team(id) => RelationScope::Team(TeamId::new(id)?),
            Self::Brand(id) => RelationScope::Brand(BrandId::new(id)?),
            Self::Agent(id) => RelationScope::Agent(AgentId::new(id)?),
        })
    }
}

/// Request to create a directed relation between two documents
#[derive(Debug, Clone)]
pub struct CreateRelationRequest {
    pub from_id: String,
    pub to_id: String,
    pub relation_type: String,
    pub prompt: Option<String>,
    pub seq: i32,
    pub scope: OwnerRef,
}

impl CreateRelationRequest {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        relation_type: impl Into<String>,
        scope: OwnerRef,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            relation_type: relation_type.into(),
            prompt: None,
            seq: 0,
            scope,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_seq(mut self, seq: i32) -> Self {
        self.seq = seq;
        self
    }
}

/// Request to store a new document
#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub owner: OwnerRef,
    pub mimetype: Option<String>,
    pub size: Option<u64>,
    pub metadata: Option<DocumentMeta>,
    pub vectorize: bool,
}

impl CreateDocumentRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>, owner: OwnerRef) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            owner,
            mimetype: None,
            size: None,
            metadata: None,
            vectorize: true,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMeta) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn without_vectorize(mut self) -> Self {
        self.vectorize = false;
        self
    }
}

/// Patch request for an existing document. A changed content re-runs
/// the chunk pipeline; `metadata: Some(None)` clears the metadata.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub metadata: Option<Option<DocumentMeta>>,
}

impl UpdateDocumentRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Option<DocumentMeta>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Document service: CRUD plus chunking and embedding
pub struct DocumentService {
    storage: Arc<dyn Storage<Document>>,
    chunk_repository: Arc<dyn ChunkRepository>,
    relation_storage: Arc<dyn Storage<DocumentRelation>>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService").finish()
    }
}

impl DocumentService {
    pub fn new(
        storage: Arc<dyn Storage<Document>>,
        chunk_repository: Arc<dyn ChunkRepository>,
        relation_storage: Arc<dyn Storage<DocumentRelation>>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            storage,
            chunk_repository,
            relation_storage,
            embedding_provider,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>, DomainError> {
        self.storage.get(&DocumentId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<Document>, DomainError> {
        self.storage.list().await
    }

    pub async fn list_for_owner(&self, owner: &DocumentOwner) -> Result<Vec<Document>, DomainError> {
        Ok(self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(|d| d.owner() == owner)
            .collect())
    }

    pub async fn create(&self, request: CreateDocumentRequest) -> Result<Document, DomainError> {
        if request.title.trim().is_empty() {
            return Err(DomainError::validation("Document title cannot be empty"));
        }

        let document_id = match request.id {
            Some(id) => DocumentId::new(id)?,
            None => DocumentId::generate(),
        };

        let mut document = Document::new(
            document_id,
            request.title,
            request.content,
            request.owner.resolve()?,
        );
        if let Some(mimetype) = request.mimetype {
            document = document.with_mimetype(mimetype);
        }
        if let Some(size) = request.size {
            document = document.with_size(size);
        }
        if let Some(metadata) = request.metadata {
            document = document.with_metadata(metadata);
        }

        let document = self.storage.create(document).await?;

        if request.vectorize {
            return self.vectorize(document).await;
        }

        Ok(document)
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateDocumentRequest,
    ) -> Result<Document, DomainError> {
        let mut document = self.require(id).await?;

        if let Some(title) = request.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("Document title cannot be empty"));
            }
            document.set_title(title);
        }
        if let Some(metadata) = request.metadata {
            document.set_metadata(metadata);
        }

        let content_changed = match request.content {
            Some(content) if content != document.content() => {
                document.set_content(content);
                true
            }
            _ => false,
        };

        let document = self.storage.update(document).await?;

        if content_changed {
            return self.vectorize(document).await;
        }

        Ok(document)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let document_id = DocumentId::new(id)?;
        self.chunk_repository.delete_for_document(&document_id).await?;
        self.storage.delete(&document_id).await
    }

    /// Chunks of a document ordered by index
    pub async fn chunks(&self, id: &str) -> Result<Vec<DocumentChunk>, DomainError> {
        self.chunk_repository
            .list_for_document(&DocumentId::new(id)?)
            .await
    }

    pub async fn create_relation(
        &self,
        request: CreateRelationRequest,
    ) -> Result<DocumentRelation, DomainError> {
        let from_id = DocumentId::new(request.from_id)?;
        let to_id = DocumentId::new(request.to_id)?;

        for id in [&from_id, &to_id] {
            if !self.storage.exists(id).await? {
                return Err(DomainError::not_found(format!("Document '{}' not found", id)));
            }
        }

        let mut relation = DocumentRelation::new(
            from_id,
            to_id,
            request.relation_type,
            request.scope.resolve_scope()?,
        )
        .with_seq(request.seq);
        if let Some(prompt) = request.prompt {
            relation = relation.with_prompt(prompt);
        }

        self.relation_storage.create(relation).await
    }

    pub async fn list_relations(&self) -> Result<Vec<DocumentRelation>, DomainError> {
        let mut relations = self.relation_storage.list().await?;
        relations.sort_by_key(|r| r.seq);
        Ok(relations)
    }

    pub async fn delete_relation(&self, id: &str) -> Result<bool, DomainError> {
        self.relation_storage.delete(&DocumentRelationId::new(id)?).await
    }

    /// Relations touching a document on either side, ordered by seq
    pub async fn relations_for_document(
        &self,
        id: &str,
    ) -> Result<Vec<DocumentRelation>, DomainError> {
        let document_id = DocumentId::new(id)?;

        let mut relations: Vec<DocumentRelation> = self
            .relation_storage
            .list()
            .await?
            .into_iter()
            .filter(|r| r.from_id == document_id || r.to_id == document_id)
            .collect();
        relations.sort_by_key(|r| r.seq);

        Ok(relations)
    }

    /// Rebuild a document's chunks and summary embedding from its current
    /// content. The previous chunk set is swapped out in one step, so a
    /// failed rebuild leaves the old chunks intact.
    pub async fn regenerate_chunks(&self, id: &str) -> Result<Document, DomainError> {
        let document = self.require(id).await?;
        self.vectorize(document).await
    }

    async fn vectorize(&self, mut document: Document) -> Result<Document, DomainError> {
        let pieces = split_text_to_chunks(document.content(), CHUNK_SIZE, CHUNK_OVERLAP);
        if pieces.is_empty() {
            self.chunk_repository
                .replace_for_document(document.id(), Vec::new())
                .await?;
            return Ok(document);
        }

        let embeddings = self.embedding_provider.embed(&pieces).await?;
        if embeddings.len() != pieces.len() {
            return Err(DomainError::provider(
                "embedding",
                format!(
                    "expected {} vectors, provider returned {}",
                    pieces.len(),
                    embeddings.len()
                ),
            ));
        }

        let chunks: Vec<DocumentChunk> = pieces
            .into_iter()
            .zip(embeddings.iter().cloned())
            .enumerate()
            .map(|(index, (content, embedding))| {
                DocumentChunk::new(document.id().clone(), index, content, embedding)
            })
            .collect();

        info!(
            document_id = %document.id(),
            chunk_count = chunks.len(),
            "Rebuilding document chunks"
        );

        self.chunk_repository
            .replace_for_document(document.id(), chunks)
            .await?;

        if let Some(summary) = average_embedding(&embeddings) {
            document.set_embedding(summary);
        }
        self.storage.update(document).await
    }

    async fn require(&self, id: &str) -> Result<Document, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Document '{}' not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::mock::MockEmbeddingProvider;
    use crate::domain::storage::mock::MockStorage;
    use crate::infrastructure::storage::InMemoryChunkRepository;

    fn service() -> DocumentService {
        DocumentService::new(
            Arc::new(MockStorage::new()),
            Arc::new(InMemoryChunkRepository::new()),
            Arc::new(MockStorage::new()),
            Arc::new(MockEmbeddingProvider::new()),
        )
    }

    #[tokio::test]
    async fn test_create_chunks_and_embeds() {
        let service = service();

        // 2500 chars with a 900-char step gives chunks at 0, 900 and 1800
        let document = service
            .create(CreateDocumentRequest::new(
                "Guide",
                "x".repeat(2500),
                OwnerRef::Brand("b-1".to_string()),
            ))
            .await
            .unwrap();

        assert!(document.vectorized());
        let chunks = service.chunks(document.id().as_str()).await.unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].content.len(), CHUNK_SIZE);
        assert_eq!(chunks[2].content.len(), 2500 - 1800);
    }

    #[tokio::test]
    async fn test_summary_embedding_is_dimension_mean() {
        let service = service();

        // Mock embeddings encode character counts: [1000,1,0] twice, then [700,1,0]
        let document = service
            .create(CreateDocumentRequest::new(
                "Guide",
                "x".repeat(2500),
                OwnerRef::Brand("b-1".to_string()),
            ))
            .await
            .unwrap();

        let embedding = document.embedding().unwrap();
        assert!((embedding[0] - (1000.0 + 1000.0 + 700.0) / 3.0).abs() < 1e-3);
        assert!((embedding[1] - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_regenerate_is_idempotent() {
        let service = service();

        let document = service
            .create(CreateDocumentRequest::new(
                "Guide",
                "x".repeat(2500),
                OwnerRef::Team("t-1".to_string()),
            ))
            .await
            .unwrap();

        service.regenerate_chunks(document.id().as_str()).await.unwrap();
        service.regenerate_chunks(document.id().as_str()).await.unwrap();

        let chunks = service.chunks(document.id().as_str()).await.unwrap();
        assert_eq!(chunks.len(), 3);
    }

    #[tokio::test]
    async fn test_content_update_rebuilds_chunks() {
        let service = service();

        let document = service
            .create(CreateDocumentRequest::new(
                "Guide",
                "x".repeat(2500),
                OwnerRef::Brand("b-1".to_string()),
            ))
            .await
            .unwrap();

        let updated = service
            .update(
                document.id().as_str(),
                UpdateDocumentRequest::new().with_content("short"),
            )
            .await
            .unwrap();

        assert!(updated.vectorized());
        let chunks = service.chunks(document.id().as_str()).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short");
    }

    #[tokio::test]
    async fn test_skip_vectorize_on_request() {
        let service = service();

        let document = service
            .create(
                CreateDocumentRequest::new("Raw", "body", OwnerRef::Agent("a-1".to_string()))
                    .without_vectorize(),
            )
            .await
            .unwrap();

        assert!(!document.vectorized());
        assert!(service.chunks(document.id().as_str()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_chunks() {
        let service = service();

        let document = service
            .create(CreateDocumentRequest::new(
                "Guide",
                "body text",
                OwnerRef::Brand("b-1".to_string()),
            ))
            .await
            .unwrap();

        assert!(service.delete(document.id().as_str()).await.unwrap());
        assert!(service.chunks(document.id().as_str()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let service = DocumentService::new(
            Arc::new(MockStorage::new()),
            Arc::new(InMemoryChunkRepository::new()),
            Arc::new(MockStorage::new()),
            Arc::new(
                MockEmbeddingProvider::new()
                    .with_error(DomainError::provider("embedding", "quota exceeded")),
            ),
        );

        let result = service
            .create(CreateDocumentRequest::new(
                "Guide",
                "body",
                OwnerRef::Brand("b-1".to_string()),
            ))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_relations_require_both_documents() {
        let service = service();

        let from = service
            .create(CreateDocumentRequest::new("A", "a", OwnerRef::Brand("b-1".to_string())))
            .await
            .unwrap();

        let missing = service
            .create_relation(CreateRelationRequest::new(
                from.id().as_str(),
                "d-ghost",
                "before-after",
                OwnerRef::Brand("b-1".to_string()),
            ))
            .await;
        assert!(matches!(missing.unwrap_err(), DomainError::NotFound { .. }));

        let to = service
            .create(CreateDocumentRequest::new("B", "b", OwnerRef::Brand("b-1".to_string())))
            .await
            .unwrap();

        let relation = service
            .create_relation(
                CreateRelationRequest::new(
                    from.id().as_str(),
                    to.id().as_str(),
                    "before-after",
                    OwnerRef::Brand("b-1".to_string()),
                )
                .with_seq(2),
            )
            .await
            .unwrap();

        let for_from = service.relations_for_document(from.id().as_str()).await.unwrap();
        assert_eq!(for_from.len(), 1);
        assert_eq!(for_from[0].id, relation.id);

        let for_to = service.relations_for_document(to.id().as_str()).await.unwrap();
        assert_eq!(for_to.len(), 1);
    }

    #[tokio::test]
    async fn test_owner_filter() {
        let service = service();

        service
            .create(CreateDocumentRequest::new("A", "a", OwnerRef::Brand("b-1".to_string())))
            .await
            .unwrap();
        service
            .create(CreateDocumentRequest::new("B", "b", OwnerRef::Brand("b-2".to_string())))
            .await
            .unwrap();

        let owner = DocumentOwner::Brand(BrandId::new("b-1").unwrap());
        let documents = service.list_for_owner(&owner).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].title(), "A");
    }
}
