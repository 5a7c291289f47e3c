use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::execution::WorkflowExecutionId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;
use crate::domain::workflow::NodeId;

define_id!(
    /// Validated agent feedback identifier
    AgentFeedbackId,
    "AgentFeedback"
);

/// Append-only feedback left on a node within one execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFeedback {
    pub id: AgentFeedbackId,
    pub workflow_execution_id: WorkflowExecutionId,
    pub node_id: NodeId,
    pub agent_id: AgentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub content: String,
    pub feedback_type: String,
    pub created_at: DateTime<Utc>,
}

impl AgentFeedback {
    pub fn new(
        workflow_execution_id: WorkflowExecutionId,
        node_id: NodeId,
        agent_id: AgentId,
        content: impl Into<String>,
        feedback_type: impl Into<String>,
    ) -> Self {
        Self {
            id: AgentFeedbackId::generate(),
            workflow_execution_id,
            node_id,
            agent_id,
            user_id: None,
            content: content.into(),
            feedback_type: feedback_type.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

impl StorageEntity for AgentFeedback {
    type Key = AgentFeedbackId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "agent_feedbacks"
    }
}
