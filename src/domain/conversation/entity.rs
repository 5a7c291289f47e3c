use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::execution::WorkflowExecutionId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;
use crate::domain::workflow::NodeId;

define_id!(
    /// Validated conversation identifier
    ConversationId,
    "Conversation"
);

/// Groups messages under a user/agent/execution context.
/// One conversation per run, reused for every message in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_execution_id: Option<WorkflowExecutionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: ConversationId::generate(),
            title: title.into(),
            user_id: None,
            agent_id: None,
            workflow_execution_id: None,
            node_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn with_execution(mut self, execution_id: WorkflowExecutionId) -> Self {
        self.workflow_execution_id = Some(execution_id);
        self
    }

    pub fn with_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }
}

impl StorageEntity for Conversation {
    type Key = ConversationId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "conversations"
    }
}
