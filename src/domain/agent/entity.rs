//! Agent domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::brand::BrandId;
use crate::domain::document::DocumentId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;

use super::Identity;

define_id!(
    /// Validated agent identifier
    AgentId,
    "Agent"
);

/// Role an agent speaks with in conversations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    System,
    Assistant,
    User,
}

/// Position an agent takes inside a team topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    /// Sole leader of a single-leader team
    LeaderSingle,
    /// One of several leaders in a multi-leader team
    LeaderMulti,
    /// Worker agent bound to individual nodes
    Worker,
}

/// A configured AI persona: prompt, model and temperature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    name: String,
    role: AgentRole,
    #[serde(rename = "type")]
    agent_type: AgentType,
    model: String,
    temperature: f32,
    prompt: String,
    #[serde(default)]
    identity: Identity,
    #[serde(default)]
    rag_docs: Vec<DocumentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand_id: Option<BrandId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Agent {
    /// Create a new worker agent with defaults (gpt-4o, temperature 0.2)
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            role: AgentRole::Assistant,
            agent_type: AgentType::Worker,
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            prompt: String::new(),
            identity: Identity::empty(),
            rag_docs: Vec::new(),
            parent_agent_id: None,
            user_id: None,
            team_id: None,
            brand_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    // Builder methods

    pub fn with_role(mut self, role: AgentRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = agent_type;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_rag_docs(mut self, rag_docs: Vec<DocumentId>) -> Self {
        self.rag_docs = rag_docs;
        self
    }

    pub fn with_parent(mut self, parent: AgentId) -> Self {
        self.parent_agent_id = Some(parent);
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn with_brand(mut self, brand_id: BrandId) -> Self {
        self.brand_id = Some(brand_id);
        self
    }

    // Getters

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn rag_docs(&self) -> &[DocumentId] {
        &self.rag_docs
    }

    pub fn parent_agent_id(&self) -> Option<&AgentId> {
        self.parent_agent_id.as_ref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    pub fn brand_id(&self) -> Option<&BrandId> {
        self.brand_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Setters (mutate and update timestamp)

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_role(&mut self, role: AgentRole) {
        self.role = role;
        self.touch();
    }

    pub fn set_type(&mut self, agent_type: AgentType) {
        self.agent_type = agent_type;
        self.touch();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        self.touch();
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature;
        self.touch();
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.touch();
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
        self.touch();
    }

    pub fn set_rag_docs(&mut self, rag_docs: Vec<DocumentId>) {
        self.rag_docs = rag_docs;
        self.touch();
    }

    pub fn set_parent_agent_id(&mut self, parent: Option<AgentId>) {
        self.parent_agent_id = parent;
        self.touch();
    }

    /// Append a document to the RAG allow-list, ignoring duplicates
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

impl StorageEntity for Agent {
    type Key = AgentId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "agents"
    }
}
