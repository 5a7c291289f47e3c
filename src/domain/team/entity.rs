use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::brand::BrandId;
use crate::domain::document::DocumentId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

define_id!(
    /// Validated team identifier
    TeamId,
    "Team"
);

/// A group of agents working together under an optional brand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand_id: Option<BrandId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    /// Documents eligible for retrieval when this team is the subject.
    /// Empty means unrestricted.
    #[serde(default)]
    rag_docs: Vec<DocumentId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            description: None,
            brand_id: None,
            user_id: None,
            rag_docs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_brand(mut self, brand_id: BrandId) -> Self {
        self.brand_id = Some(brand_id);
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

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn brand_id(&self) -> Option<&BrandId> {
        self.brand_id.as_ref()
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

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn set_brand_id(&mut self, brand_id: Option<BrandId>) {
        self.brand_id = brand_id;
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

impl StorageEntity for Team {
    type Key = TeamId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "teams"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_creation() {
        let team = Team::new(TeamId::new("t-1").unwrap(), "Content Team")
            .with_description("Writes marketing copy")
            .with_brand(BrandId::new("b-1").unwrap());

        assert_eq!(team.name(), "Content Team");
        assert_eq!(team.description(), Some("Writes marketing copy"));
        assert_eq!(team.brand_id().map(|b| b.as_str()), Some("b-1"));
    }
}
