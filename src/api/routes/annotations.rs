//! Feedback and confirm endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::annotation::{AgentConfirm, AgentFeedback, ConfirmStatus};
use crate::infrastructure::services::{CreateConfirmRequest, CreateFeedbackRequest};

/// Request to record feedback on a node's output
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeedbackApiRequest {
    pub workflow_execution_id: String,
    pub node_id: String,
    pub agent_id: String,
    pub user_id: Option<String>,
    pub content: String,
    pub feedback_type: String,
}

/// Request to record a confirmation decision
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConfirmApiRequest {
    pub workflow_execution_id: String,
    pub node_id: String,
    pub agent_id: String,
    pub user_id: Option<String>,
    #[serde(default = "default_confirm_status")]
    pub status: ConfirmStatus,
    pub reason: Option<String>,
}

fn default_confirm_status() -> ConfirmStatus {
    ConfirmStatus::Pending
}

/// Request to move a confirm to a new decision
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConfirmApiRequest {
    pub status: ConfirmStatus,
    pub reason: Option<String>,
}

/// Filters for annotation queries; at least one must be present
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationQuery {
    pub workflow_execution_id: Option<String>,
    pub node_id: Option<String>,
}

/// List feedbacks response
#[derive(Debug, Clone, Serialize)]
pub struct ListFeedbacksResponse {
    pub feedbacks: Vec<AgentFeedback>,
    pub total: usize,
}

/// List confirms response
#[derive(Debug, Clone, Serialize)]
pub struct ListConfirmsResponse {
    pub confirms: Vec<AgentConfirm>,
    pub total: usize,
}

/// POST /feedbacks
pub async fn create_feedback(
    State(state): State<AppState>,
    Json(request): Json<CreateFeedbackApiRequest>,
) -> Result<Json<AgentFeedback>, ApiError> {
    debug!(
        execution_id = %request.workflow_execution_id,
        node_id = %request.node_id,
        "Recording feedback"
    );

    let create_request = CreateFeedbackRequest {
        workflow_execution_id: request.workflow_execution_id,
        node_id: request.node_id,
        agent_id: request.agent_id,
        user_id: request.user_id,
        content: request.content,
        feedback_type: request.feedback_type,
    };

    let feedback = state
        .annotation_service
        .create_feedback(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(feedback))
}

/// GET /feedbacks?workflow_execution_id=..&node_id=..
pub async fn list_feedbacks(
    State(state): State<AppState>,
    Query(query): Query<AnnotationQuery>,
) -> Result<Json<ListFeedbacksResponse>, ApiError> {
    let feedbacks = match (&query.workflow_execution_id, &query.node_id) {
        (Some(execution_id), Some(node_id)) => state
            .annotation_service
            .feedback_for_node(execution_id, node_id)
            .await
            .map_err(ApiError::from)?,
        (Some(execution_id), None) => state
            .annotation_service
            .feedback_for_execution(execution_id)
            .await
            .map_err(ApiError::from)?,
        _ => {
            return Err(ApiError::bad_request(
                "Query parameter 'workflow_execution_id' is required",
            ));
        }
    };
    let total = feedbacks.len();

    Ok(Json(ListFeedbacksResponse { feedbacks, total }))
}

/// POST /confirms
pub async fn create_confirm(
    State(state): State<AppState>,
    Json(request): Json<CreateConfirmApiRequest>,
) -> Result<Json<AgentConfirm>, ApiError> {
    debug!(
        execution_id = %request.workflow_execution_id,
        node_id = %request.node_id,
        "Recording confirm"
    );

    let create_request = CreateConfirmRequest {
        workflow_execution_id: request.workflow_execution_id,
        node_id: request.node_id,
        agent_id: request.agent_id,
        user_id: request.user_id,
        status: request.status,
        reason: request.reason,
    };

    let confirm = state
        .annotation_service
        .create_confirm(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(confirm))
}

/// PATCH /confirms/:confirm_id
pub async fn update_confirm(
    State(state): State<AppState>,
    Path(confirm_id): Path<String>,
    Json(request): Json<UpdateConfirmApiRequest>,
) -> Result<Json<AgentConfirm>, ApiError> {
    debug!(confirm_id = %confirm_id, status = ?request.status, "Updating confirm");

    let confirm = state
        .annotation_service
        .update_confirm(&confirm_id, request.status, request.reason)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(confirm))
}

/// GET /confirms?workflow_execution_id=..&node_id=..
pub async fn list_confirms(
    State(state): State<AppState>,
    Query(query): Query<AnnotationQuery>,
) -> Result<Json<ListConfirmsResponse>, ApiError> {
    let confirms = match (&query.workflow_execution_id, &query.node_id) {
        (Some(execution_id), Some(node_id)) => state
            .annotation_service
            .confirms_for_node(execution_id, node_id)
            .await
            .map_err(ApiError::from)?,
        (Some(execution_id), None) => state
            .annotation_service
            .confirms_for_execution(execution_id)
            .await
            .map_err(ApiError::from)?,
        _ => {
            return Err(ApiError::bad_request(
                "Query parameter 'workflow_execution_id' is required",
            ));
        }
    };
    let total = confirms.len();

    Ok(Json(ListConfirmsResponse { confirms, total }))
}
