//! Workflow execution record endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::conversation::{Message, MessageRole};
use crate::domain::execution::{ExecutionStatus, NodeResult, WorkflowExecution};
use crate::infrastructure::services::SaveMessageRequest;

/// Optional list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListExecutionsQuery {
    pub workflow_id: Option<String>,
    pub user_id: Option<String>,
}

/// List executions response
#[derive(Debug, Clone, Serialize)]
pub struct ListExecutionsResponse {
    pub executions: Vec<WorkflowExecution>,
    pub total: usize,
}

/// Externally supplied status change
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusApiRequest {
    pub status: ExecutionStatus,
    pub error: Option<String>,
}

/// List node results response
#[derive(Debug, Clone, Serialize)]
pub struct ListNodeResultsResponse {
    pub node_results: Vec<NodeResult>,
    pub total: usize,
}

/// List messages response
#[derive(Debug, Clone, Serialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<Message>,
    pub total: usize,
}

/// Request to append a message to an execution's conversation
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageApiRequest {
    pub role: MessageRole,
    pub content: String,
    pub node_id: Option<String>,
    pub agent_id: Option<String>,
}

/// GET /workflow-executions
pub async fn list_executions(
    State(state): State<AppState>,
    Query(query): Query<ListExecutionsQuery>,
) -> Result<Json<ListExecutionsResponse>, ApiError> {
    let mut executions = match query.workflow_id {
        Some(workflow_id) => state
            .execution_service
            .list_for_workflow(&workflow_id)
            .await
            .map_err(ApiError::from)?,
        None => state
            .execution_service
            .list()
            .await
            .map_err(ApiError::from)?,
    };

    if let Some(user_id) = query.user_id {
        executions.retain(|e| e.user_id().map(|u| u.as_str()) == Some(user_id.as_str()));
    }
    let total = executions.len();

    Ok(Json(ListExecutionsResponse { executions, total }))
}

/// GET /workflow-executions/:execution_id
pub async fn get_execution(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Json<WorkflowExecution>, ApiError> {
    let execution = state
        .execution_service
        .get(&execution_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::not_found(format!("Workflow execution '{}' not found", execution_id))
        })?;

    Ok(Json(execution))
}

/// PATCH /workflow-executions/:execution_id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
    Json(request): Json<UpdateStatusApiRequest>,
) -> Result<Json<WorkflowExecution>, ApiError> {
    debug!(execution_id = %execution_id, status = ?request.status, "Updating execution status");

    let execution = state
        .execution_service
        .update_status(&execution_id, request.status, request.error)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(execution))
}

/// GET /workflow-executions/:execution_id/node-results
pub async fn list_node_results(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Json<ListNodeResultsResponse>, ApiError> {
    let node_results = state
        .execution_service
        .node_results(&execution_id)
        .await
        .map_err(ApiError::from)?;
    let total = node_results.len();

    Ok(Json(ListNodeResultsResponse {
        node_results,
        total,
    }))
}

/// GET /workflow-executions/:execution_id/messages
///
/// Collects messages across every conversation tied to the execution.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Json<ListMessagesResponse>, ApiError> {
    let conversations = state
        .conversation_service
        .for_execution(&execution_id)
        .await
        .map_err(ApiError::from)?;

    let mut messages = Vec::new();
    for conversation in &conversations {
        let mut batch = state
            .conversation_service
            .messages(conversation.id.as_str())
            .await
            .map_err(ApiError::from)?;
        messages.append(&mut batch);
    }
    messages.sort_by_key(|m| m.created_at);
    let total = messages.len();

    Ok(Json(ListMessagesResponse { messages, total }))
}

/// POST /workflow-executions/:execution_id/messages
///
/// Appends to the execution's first conversation.
pub async fn post_message(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
    Json(request): Json<PostMessageApiRequest>,
) -> Result<Json<Message>, ApiError> {
    debug!(execution_id = %execution_id, "Appending execution message");

    let conversation = state
        .conversation_service
        .for_execution(&execution_id)
        .await
        .map_err(ApiError::from)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No conversation recorded for execution '{}'",
                execution_id
            ))
        })?;

    let mut save_request = SaveMessageRequest::new(
        conversation.id.as_str(),
        request.role,
        request.content,
    )
    .with_execution(execution_id.as_str());
    if let Some(node_id) = request.node_id {
        save_request = save_request.with_node(node_id);
    }
    if let Some(agent_id) = request.agent_id {
        save_request = save_request.with_agent(agent_id);
    }

    let message = state
        .conversation_service
        .save_message(save_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_request_deserialization() {
        let request: UpdateStatusApiRequest =
            serde_json::from_str(r#"{"status": "FAILED", "error": "provider timeout"}"#).unwrap();

        assert_eq!(request.status, ExecutionStatus::Failed);
        assert_eq!(request.error.as_deref(), Some("provider timeout"));
    }

    #[test]
    fn test_status_request_without_error() {
        let request: UpdateStatusApiRequest =
            serde_json::from_str(r#"{"status": "COMPLETED"}"#).unwrap();

        assert_eq!(request.status, ExecutionStatus::Completed);
        assert!(request.error.is_none());
    }

    #[test]
    fn test_post_message_request() {
        let request: PostMessageApiRequest = serde_json::from_str(
            r#"{"role": "USER", "content": "retry the last step", "node_id": "n-2"}"#,
        )
        .unwrap();

        assert_eq!(request.role, MessageRole::User);
        assert_eq!(request.node_id.as_deref(), Some("n-2"));
        assert!(request.agent_id.is_none());
    }
}
