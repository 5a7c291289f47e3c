use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::document::DocumentId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

define_id!(
    /// Validated brand identifier
    BrandId,
    "Brand"
);

/// A brand owned by a user, carrying its mission and tone guideline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    id: BrandId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guide_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    /// Documents eligible for retrieval when this brand is the subject.
    /// Empty means unrestricted.
    #[serde(default)]
    rag_docs: Vec<DocumentId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(id: BrandId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            mission: None,
            guide_line: None,
            user_id: None,
            rag_docs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    pub fn with_guide_line(mut self, guide_line: impl Into<String>) -> Self {
        self.guide_line = Some(guide_line.into());
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_rag_docs(mut self, rag_docs: Vec<DocumentId>) -> Self {
        self.rag_docs = rag_docs;
        self
    }

    pub fn id(&self) -> &BrandId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mission(&self) -> Option<&str> {
        self.mission.as_deref()
    }

    pub fn guide_line(&self) -> Option<&str> {
        self.guide_line.as_deref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn rag_docs(&self) -> &[DocumentId] {
        &self.rag_docs
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_mission(&mut self, mission: Option<String>) {
        self.mission = mission;
        self.touch();
    }

    pub fn set_guide_line(&mut self, guide_line: Option<String>) {
        self.guide_line = guide_line;
        self.touch();
    }

    pub fn set_rag_docs(&mut self, rag_docs: Vec<DocumentId>) {
        self.rag_docs = rag_docs;
        self.touch();
    }

    pub fn add_rag_doc(&mut self, doc_id: DocumentId) {
        if !self.rag_docs.contains(&doc_id) {
            self.rag_docs.push(doc_id);
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Brand {
    type Key = BrandId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "brands"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_creation() {
        let brand = Brand::new(BrandId::new("b-1").unwrap(), "Acme")
            .with_mission("Make anvils accessible")
            .with_guide_line("Friendly and direct");

        assert_eq!(brand.name(), "Acme");
        assert_eq!(brand.mission(), Some("Make anvils accessible"));
        assert_eq!(brand.guide_line(), Some("Friendly and direct"));
        assert!(brand.user_id().is_none());
    }

    #[test]
    fn test_add_rag_doc_is_set_union() {
        let mut brand = Brand::new(BrandId::new("b-1").unwrap(), "Acme");
        brand.add_rag_doc(DocumentId::new("d-1").unwrap());
        brand.add_rag_doc(DocumentId::new("d-1").unwrap());
        brand.add_rag_doc(DocumentId::new("d-2").unwrap());

        let ids: Vec<&str> = brand.rag_docs().iter().map(|d| d.as_str()).collect();
        assert_eq!(ids, vec!["d-1", "d-2"]);
    }

    #[test]
    fn test_deserializes_without_rag_docs() {
        let brand = Brand::new(BrandId::new("b-1").unwrap(), "Acme");
        let mut json = serde_json::to_value(&brand).unwrap();
        json.as_object_mut().unwrap().remove("rag_docs");

        let restored: Brand = serde_json::from_value(json).unwrap();
        assert!(restored.rag_docs().is_empty());
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let brand = Brand::new(BrandId::new("b-1").unwrap(), "Acme");
        let json = serde_json::to_value(&brand).unwrap();

        assert!(json.get("mission").is_none());
        assert!(json.get("guide_line").is_none());
        assert!(json.get("user_id").is_none());
    }
}
