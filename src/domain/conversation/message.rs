use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::execution::WorkflowExecutionId;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::workflow::NodeId;

use super::ConversationId;

define_id!(
    /// Validated message identifier
    MessageId,
    "Message"
);

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One append-only message inside a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_execution_id: Option<WorkflowExecutionId>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        conversation_id: ConversationId,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            role,
            content: content.into(),
            node_id: None,
            agent_id: None,
            workflow_execution_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
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
}

impl StorageEntity for Message {
    type Key = MessageId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "messages"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_serialization() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"ASSISTANT\""
        );
    }

    #[test]
    fn test_message_scoping() {
        let message = Message::new(
            ConversationId::new("c-1").unwrap(),
            MessageRole::User,
            "hello",
        )
        .with_node(NodeId::new("n-1").unwrap())
        .with_execution(WorkflowExecutionId::new("e-1").unwrap());

        assert_eq!(message.content, "hello");
        assert!(message.node_id.is_some());
        assert!(message.workflow_execution_id.is_some());
        assert!(message.agent_id.is_none());
    }
}
