//! Conversation service - append-only message recording

use std::sync::Arc;

use crate::domain::agent::AgentId;
use crate::domain::conversation::{Conversation, ConversationId, Message, MessageRole};
use crate::domain::execution::WorkflowExecutionId;
use crate::domain::storage::Storage;
use crate::domain::user::UserId;
use crate::domain::workflow::NodeId;
use crate::domain::DomainError;

/// Request to append one message to a conversation
#[derive(Debug, Clone)]
pub struct SaveMessageRequest {
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub node_id: Option<String>,
    pub agent_id: Option<String>,
    pub workflow_execution_id: Option<String>,
}

impl SaveMessageRequest {
    pub fn new(
        conversation_id: impl Into<String>,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            role,
            content: content.into(),
            node_id: None,
            agent_id: None,
            workflow_execution_id: None,
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_execution(mut self, execution_id: impl Into<String>) -> Self {
        self.workflow_execution_id = Some(execution_id.into());
        self
    }
}

/// Conversation service for conversations and their messages
pub struct ConversationService {
    storage: Arc<dyn Storage<Conversation>>,
    message_storage: Arc<dyn Storage<Message>>,
}

impl std::fmt::Debug for ConversationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationService").finish()
    }
}

impl ConversationService {
    pub fn new(
        storage: Arc<dyn Storage<Conversation>>,
        message_storage: Arc<dyn Storage<Message>>,
    ) -> Self {
        Self {
            storage,
            message_storage,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Conversation>, DomainError> {
        self.storage.get(&ConversationId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<Conversation>, DomainError> {
        self.storage.list().await
    }

    /// Create a conversation scoped to an execution run
    pub async fn create_for_execution(
        &self,
        execution_id: &WorkflowExecutionId,
        user_id: Option<&UserId>,
        title: impl Into<String>,
    ) -> Result<Conversation, DomainError> {
        let mut conversation = Conversation::new(title).with_execution(execution_id.clone());

        if let Some(user_id) = user_id {
            conversation = conversation.with_user(user_id.clone());
        }

        self.storage.create(conversation).await
    }

    /// Conversations attached to an execution, oldest first
    pub async fn for_execution(
        &self,
        execution_id: &str,
    ) -> Result<Vec<Conversation>, DomainError> {
        let execution_id = WorkflowExecutionId::new(execution_id)?;

        let mut conversations: Vec<Conversation> = self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(|c| c.workflow_execution_id.as_ref() == Some(&execution_id))
            .collect();
        conversations.sort_by_key(|c| c.created_at);

        Ok(conversations)
    }

    /// Pure append: every call creates a new message row, identical
    /// content included.
    pub async fn save_message(&self, request: SaveMessageRequest) -> Result<Message, DomainError> {
        let conversation_id = ConversationId::new(request.conversation_id)?;

        if !self.storage.exists(&conversation_id).await? {
            return Err(DomainError::not_found(format!(
                "Conversation '{}' not found",
                conversation_id
            )));
        }

        let mut message = Message::new(conversation_id, request.role, request.content);

        if let Some(node_id) = request.node_id {
            message = message.with_node(NodeId::new(node_id)?);
        }

        if let Some(agent_id) = request.agent_id {
            message = message.with_agent(AgentId::new(agent_id)?);
        }

        if let Some(execution_id) = request.workflow_execution_id {
            message = message.with_execution(WorkflowExecutionId::new(execution_id)?);
        }

        self.message_storage.create(message).await
    }

    /// Messages of one conversation, oldest first
    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, DomainError> {
        let conversation_id = ConversationId::new(conversation_id)?;

        let mut messages: Vec<Message> = self
            .message_storage
            .list()
            .await?
            .into_iter()
            .filter(|m| m.conversation_id == conversation_id)
            .collect();
        messages.sort_by_key(|m| m.created_at);

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::mock::MockStorage;

    fn service() -> ConversationService {
        ConversationService::new(Arc::new(MockStorage::new()), Arc::new(MockStorage::new()))
    }

    #[tokio::test]
    async fn test_save_message_is_pure_append() {
        let service = service();
        let execution_id = WorkflowExecutionId::new("e-1").unwrap();
        let conversation = service
            .create_for_execution(&execution_id, None, "Run #e-1")
            .await
            .unwrap();

        let request = SaveMessageRequest::new(
            conversation.id.as_str(),
            MessageRole::User,
            "same content",
        );
        service.save_message(request.clone()).await.unwrap();
        service.save_message(request).await.unwrap();

        let messages = service.messages(conversation.id.as_str()).await.unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_save_message_requires_conversation() {
        let service = service();

        let result = service
            .save_message(SaveMessageRequest::new("c-404", MessageRole::User, "hi"))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_messages_sorted_oldest_first() {
        let service = service();
        let execution_id = WorkflowExecutionId::new("e-1").unwrap();
        let conversation = service
            .create_for_execution(&execution_id, None, "Run")
            .await
            .unwrap();

        for content in ["first", "second", "third"] {
            service
                .save_message(SaveMessageRequest::new(
                    conversation.id.as_str(),
                    MessageRole::Assistant,
                    content,
                ))
                .await
                .unwrap();
        }

        let messages = service.messages(conversation.id.as_str()).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }
}
