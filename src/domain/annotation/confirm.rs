use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::execution::WorkflowExecutionId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;
use crate::domain::workflow::NodeId;

define_id!(
    /// Validated agent confirm identifier
    AgentConfirmId,
    "AgentConfirm"
);

/// Review decision recorded against a node's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmStatus {
    Pending,
    Approved,
    Rejected,
}

/// Append-only confirmation left on a node within one execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfirm {
    pub id: AgentConfirmId,
    pub workflow_execution_id: WorkflowExecutionId,
    pub node_id: NodeId,
    pub agent_id: AgentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub status: ConfirmStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AgentConfirm {
    pub fn new(
        workflow_execution_id: WorkflowExecutionId,
        node_id: NodeId,
        agent_id: AgentId,
        status: ConfirmStatus,
    ) -> Self {
        Self {
            id: AgentConfirmId::generate(),
            workflow_execution_id,
            node_id,
            agent_id,
            user_id: None,
            status,
            reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl StorageEntity for AgentConfirm {
    type Key = AgentConfirmId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "agent_confirms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ConfirmStatus::Approved).unwrap(),
            "\"APPROVED\""
        );
    }
}
