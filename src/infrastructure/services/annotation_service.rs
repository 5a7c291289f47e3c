//! Annotation service - per-node feedback and confirmation records

use std::sync::Arc;

use crate::domain::agent::AgentId;
use crate::domain::annotation::{AgentConfirm, AgentConfirmId, AgentFeedback, ConfirmStatus};
use crate::domain::execution::WorkflowExecutionId;
use crate::domain::storage::Storage;
use crate::domain::user::UserId;
use crate::domain::workflow::NodeId;
use crate::domain::DomainError;

/// Request to record feedback on a node's output
#[derive(Debug, Clone)]
pub struct CreateFeedbackRequest {
    pub workflow_execution_id: String,
    pub node_id: String,
    pub agent_id: String,
    pub user_id: Option<String>,
    pub content: String,
    pub feedback_type: String,
}

impl CreateFeedbackRequest {
    pub fn new(
        workflow_execution_id: impl Into<String>,
        node_id: impl Into<String>,
        agent_id: impl Into<String>,
        content: impl Into<String>,
        feedback_type: impl Into<String>,
    ) -> Self {
        Self {
            workflow_execution_id: workflow_execution_id.into(),
            node_id: node_id.into(),
            agent_id: agent_id.into(),
            user_id: None,
            content: content.into(),
            feedback_type: feedback_type.into(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Request to record a confirmation decision on a node's output
#[derive(Debug, Clone)]
pub struct CreateConfirmRequest {
    pub workflow_execution_id: String,
    pub node_id: String,
    pub agent_id: String,
    pub user_id: Option<String>,
    pub status: ConfirmStatus,
    pub reason: Option<String>,
}

impl CreateConfirmRequest {
    pub fn new(
        workflow_execution_id: impl Into<String>,
        node_id: impl Into<String>,
        agent_id: impl Into<String>,
        status: ConfirmStatus,
    ) -> Self {
        Self {
            workflow_execution_id: workflow_execution_id.into(),
            node_id: node_id.into(),
            agent_id: agent_id.into(),
            user_id: None,
            status,
            reason: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Annotation service for feedback and confirm records
pub struct AnnotationService {
    feedback_storage: Arc<dyn Storage<AgentFeedback>>,
    confirm_storage: Arc<dyn Storage<AgentConfirm>>,
}

impl std::fmt::Debug for AnnotationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationService").finish()
    }
}

impl AnnotationService {
    pub fn new(
        feedback_storage: Arc<dyn Storage<AgentFeedback>>,
        confirm_storage: Arc<dyn Storage<AgentConfirm>>,
    ) -> Self {
        Self {
            feedback_storage,
            confirm_storage,
        }
    }

    pub async fn create_feedback(
        &self,
        request: CreateFeedbackRequest,
    ) -> Result<AgentFeedback, DomainError> {
        if request.content.trim().is_empty() {
            return Err(DomainError::validation("Feedback content cannot be empty"));
        }

        let mut feedback = AgentFeedback::new(
            WorkflowExecutionId::new(request.workflow_execution_id)?,
            NodeId::new(request.node_id)?,
            AgentId::new(request.agent_id)?,
            request.content,
            request.feedback_type,
        );

        if let Some(user_id) = request.user_id {
            feedback = feedback.with_user(UserId::new(user_id)?);
        }

        self.feedback_storage.create(feedback).await
    }

    pub async fn create_confirm(
        &self,
        request: CreateConfirmRequest,
    ) -> Result<AgentConfirm, DomainError> {
        let mut confirm = AgentConfirm::new(
            WorkflowExecutionId::new(request.workflow_execution_id)?,
            NodeId::new(request.node_id)?,
            AgentId::new(request.agent_id)?,
            request.status,
        );

        if let Some(user_id) = request.user_id {
            confirm = confirm.with_user(UserId::new(user_id)?);
        }

        if let Some(reason) = request.reason {
            confirm = confirm.with_reason(reason);
        }

        self.confirm_storage.create(confirm).await
    }

    /// Move a confirm to a new decision, replacing the reason when given
    pub async fn update_confirm(
        &self,
        id: &str,
        status: ConfirmStatus,
        reason: Option<String>,
    ) -> Result<AgentConfirm, DomainError> {
        let confirm_id = AgentConfirmId::new(id)?;
        let mut confirm = self
            .confirm_storage
            .get(&confirm_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Confirm '{}' not found", id)))?;

        confirm.status = status;
        if let Some(reason) = reason {
            confirm.reason = Some(reason);
        }

        self.confirm_storage.update(confirm).await
    }

    /// Feedback for one execution, oldest first
    pub async fn feedback_for_execution(
        &self,
        execution_id: &str,
    ) -> Result<Vec<AgentFeedback>, DomainError> {
        let execution_id = WorkflowExecutionId::new(execution_id)?;

        let mut feedback: Vec<AgentFeedback> = self
            .feedback_storage
            .list()
            .await?
            .into_iter()
            .filter(|f| f.workflow_execution_id == execution_id)
            .collect();
        feedback.sort_by_key(|f| f.created_at);

        Ok(feedback)
    }

    /// Feedback for one node within an execution, oldest first
    pub async fn feedback_for_node(
        &self,
        execution_id: &str,
        node_id: &str,
    ) -> Result<Vec<AgentFeedback>, DomainError> {
        let node_id = NodeId::new(node_id)?;
        Ok(self
            .feedback_for_execution(execution_id)
            .await?
            .into_iter()
            .filter(|f| f.node_id == node_id)
            .collect())
    }

    /// Confirms for one execution, oldest first
    pub async fn confirms_for_execution(
        &self,
        execution_id: &str,
    ) -> Result<Vec<AgentConfirm>, DomainError> {
        let execution_id = WorkflowExecutionId::new(execution_id)?;

        let mut confirms: Vec<AgentConfirm> = self
            .confirm_storage
            .list()
            .await?
            .into_iter()
            .filter(|c| c.workflow_execution_id == execution_id)
            .collect();
        confirms.sort_by_key(|c| c.created_at);

        Ok(confirms)
    }

    /// Confirms for one node within an execution, oldest first
    pub async fn confirms_for_node(
        &self,
        execution_id: &str,
        node_id: &str,
    ) -> Result<Vec<AgentConfirm>, DomainError> {
        let node_id = NodeId::new(node_id)?;
        Ok(self
            .confirms_for_execution(execution_id)
            .await?
            .into_iter()
            .filter(|c| c.node_id == node_id)
            .collect())
    }
}
