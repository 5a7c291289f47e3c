use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::brand::BrandId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::team::TeamId;

define_id!(
    /// Validated document identifier
    DocumentId,
    "Document"
);

/// The single owner a document is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DocumentOwner {
    Team(TeamId),
    Brand(BrandId),
    Agent(AgentId),
}

/// Known metadata shapes, with an escape hatch for anything else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentMeta {
    Guide { guide: String },
    Unstructured(serde_json::Value),
}

impl DocumentMeta {
    pub fn guide(&self) -> Option<&str> {
        match self {
            Self::Guide { guide } => Some(guide),
            Self::Unstructured(value) => value.get("guide").and_then(|g| g.as_str()),
        }
    }
}

/// A stored text with its chunk-derived summary embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    title: String,
    content: String,
    size: u64,
    mimetype: String,
    owner: DocumentOwner,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<DocumentMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding: Option<Vec<f32>>,
    vectorized: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: DocumentId, title: impl Into<String>, content: impl Into<String>, owner: DocumentOwner) -> Self {
        let now = Utc::now();
        let content = content.into();
        Self {
            id,
            title: title.into(),
            size: content.len() as u64,
            content,
            mimetype: "text/plain".to_string(),
            owner,
            metadata: None,
            embedding: None,
            vectorized: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMeta) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    pub fn owner(&self) -> &DocumentOwner {
        &self.owner
    }

    pub fn metadata(&self) -> Option<&DocumentMeta> {
        self.metadata.as_ref()
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn vectorized(&self) -> bool {
        self.vectorized
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.size = self.content.len() as u64;
        self.vectorized = false;
        self.touch();
    }

    pub fn set_metadata(&mut self, metadata: Option<DocumentMeta>) {
        self.metadata = metadata;
        self.touch();
    }

    /// Record the averaged chunk embedding and mark the document vectorized
    pub fn set_embedding(&mut self, embedding: Vec<f32>) {
        self.embedding = Some(embedding);
        self.vectorized = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Document {
    type Key = DocumentId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "documents"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(
            DocumentId::new("d-1").unwrap(),
            "Brand Guide",
            "Write warmly.",
            DocumentOwner::Brand(BrandId::new("b-1").unwrap()),
        )
    }

    #[test]
    fn test_size_defaults_to_content_length() {
        assert_eq!(doc().size(), "Write warmly.".len() as u64);
    }

    #[test]
    fn test_set_embedding_marks_vectorized() {
        let mut document = doc();
        assert!(!document.vectorized());

        document.set_embedding(vec![0.1, 0.2]);
        assert!(document.vectorized());
        assert_eq!(document.embedding(), Some([0.1, 0.2].as_slice()));
    }

    #[test]
    fn test_content_change_clears_vectorized_flag() {
        let mut document = doc();
        document.set_embedding(vec![0.1]);
        document.set_content("New content");

        assert!(!document.vectorized());
    }

    #[test]
    fn test_owner_serialization() {
        let owner = DocumentOwner::Team(TeamId::new("t-1").unwrap());
        let json = serde_json::to_value(&owner).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "team", "id": "t-1" }));
    }

    #[test]
    fn test_metadata_guide_from_unstructured() {
        let meta = DocumentMeta::Unstructured(serde_json::json!({ "guide": "tone", "x": 1 }));
        assert_eq!(meta.guide(), Some("tone"));
    }
}
