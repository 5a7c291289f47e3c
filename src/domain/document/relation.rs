use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::brand::BrandId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::team::TeamId;

use super::DocumentId;

define_id!(
    /// Validated document relation identifier
    DocumentRelationId,
    "DocumentRelation"
);

/// The single subject a relation is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RelationScope {
    Brand(BrandId),
    Team(TeamId),
    Agent(AgentId),
}

/// Directed labeled edge between two documents, e.g. "before-after"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRelation {
    pub id: DocumentRelationId,
    pub from_id: DocumentId,
    pub to_id: DocumentId,
    pub relation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub seq: i32,
    pub scope: RelationScope,
    pub created_at: DateTime<Utc>,
}

impl DocumentRelation {
    pub fn new(
        from_id: DocumentId,
        to_id: DocumentId,
        relation_type: impl Into<String>,
        scope: RelationScope,
    ) -> Self {
        Self {
            id: DocumentRelationId::generate(),
            from_id,
            to_id,
            relation_type: relation_type.into(),
            prompt: None,
            seq: 0,
            scope,
            created_at: Utc::now(),
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

impl StorageEntity for DocumentRelation {
    type Key = DocumentRelationId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "document_relations"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_scope_serialization() {
        let scope = RelationScope::Brand(BrandId::new("b-1").unwrap());
        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "brand", "id": "b-1" }));
    }
}
