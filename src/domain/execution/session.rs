use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;

define_id!(
    /// Validated agent session identifier
    AgentSessionId,
    "AgentSession"
);

/// Lifecycle of a single agent invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
    Active,
}

/// One agent invocation scoped to a node execution attempt.
/// Sessions are never reused across nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSession {
    id: AgentSessionId,
    agent_id: AgentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    status: SessionStatus,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AgentSession {
    pub fn new(id: AgentSessionId, agent_id: AgentId) -> Self {
        let now = Utc::now();
        Self {
            id,
            agent_id,
            user_id: None,
            status: SessionStatus::Running,
            messages: Vec::new(),
            variables: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_variables(mut self, variables: serde_json::Value) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn id(&self) -> &AgentSessionId {
        &self.id
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn variables(&self) -> Option<&serde_json::Value> {
        self.variables.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn append_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        self.touch();
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for AgentSession {
    type Key = AgentSessionId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "agent_sessions"
    }
}
