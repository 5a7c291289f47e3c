//! Workflow and node management endpoints plus run triggers

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::execution::{ExecutionMode, ExecutionOutcome};
use crate::domain::workflow::{NodePosition, TeamLeaderType, Workflow};
use crate::infrastructure::services::{
    CreateNodeRequest, CreateWorkflowRequest, UpdateNodeRequest, UpdateWorkflowRequest,
};

use super::patch_field;

/// Request to create a workflow
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflowApiRequest {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default = "default_leader_type")]
    pub team_leader_type: TeamLeaderType,
    pub leader_agent_id: Option<String>,
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    pub brand_id: Option<String>,
}

fn default_leader_type() -> TeamLeaderType {
    TeamLeaderType::Single
}

/// Partial update; explicit `null` clears the field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkflowApiRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub team_leader_type: Option<TeamLeaderType>,
    #[serde(default, deserialize_with = "patch_field")]
    pub leader_agent_id: Option<Option<String>>,
}

/// Request to append a node to a workflow
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNodeApiRequest {
    pub id: Option<String>,
    pub name: String,
    pub node_type: Option<String>,
    pub order: Option<i32>,
    pub leader_agent_id: Option<String>,
    pub worker_agent_id: Option<String>,
    pub position: Option<NodePosition>,
    pub data: Option<serde_json::Value>,
}

/// Partial node update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNodeApiRequest {
    pub name: Option<String>,
    pub node_type: Option<String>,
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "patch_field")]
    pub leader_agent_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub worker_agent_id: Option<Option<String>>,
    pub position: Option<NodePosition>,
    #[serde(default, deserialize_with = "patch_field")]
    pub data: Option<Option<serde_json::Value>>,
}

/// Request to move a node to a new position in the order
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderNodeApiRequest {
    pub order: i32,
}

/// Request to run a workflow
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunWorkflowApiRequest {
    pub user_id: Option<String>,
    pub input: Option<serde_json::Value>,
}

/// List workflows response
#[derive(Debug, Clone, Serialize)]
pub struct ListWorkflowsResponse {
    pub workflows: Vec<Workflow>,
    pub total: usize,
}

/// GET /workflows
pub async fn list_workflows(
    State(state): State<AppState>,
) -> Result<Json<ListWorkflowsResponse>, ApiError> {
    let workflows = state
        .workflow_service
        .list()
        .await
        .map_err(ApiError::from)?;
    let total = workflows.len();

    Ok(Json(ListWorkflowsResponse { workflows, total }))
}

/// POST /workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkflowApiRequest>,
) -> Result<Json<Workflow>, ApiError> {
    debug!(name = %request.name, "Creating workflow");

    let create_request = CreateWorkflowRequest {
        id: request.id,
        name: request.name,
        description: request.description,
        is_public: request.is_public,
        team_leader_type: request.team_leader_type,
        leader_agent_id: request.leader_agent_id,
        user_id: request.user_id,
        team_id: request.team_id,
        brand_id: request.brand_id,
    };

    let workflow = state
        .workflow_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(workflow))
}

/// GET /workflows/:workflow_id
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = state
        .workflow_service
        .get(&workflow_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Workflow '{}' not found", workflow_id)))?;

    Ok(Json(workflow))
}

/// PATCH /workflows/:workflow_id
pub async fn update_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<UpdateWorkflowApiRequest>,
) -> Result<Json<Workflow>, ApiError> {
    debug!(workflow_id = %workflow_id, "Updating workflow");

    let update_request = UpdateWorkflowRequest {
        name: request.name,
        description: request.description,
        is_public: request.is_public,
        team_leader_type: request.team_leader_type,
        leader_agent_id: request.leader_agent_id,
    };

    let workflow = state
        .workflow_service
        .update(&workflow_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(workflow))
}

/// DELETE /workflows/:workflow_id
pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(workflow_id = %workflow_id, "Deleting workflow");

    let deleted = state
        .workflow_service
        .delete(&workflow_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": deleted,
        "id": workflow_id
    })))
}

/// POST /workflows/:workflow_id/nodes
pub async fn add_node(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<CreateNodeApiRequest>,
) -> Result<Json<Workflow>, ApiError> {
    debug!(workflow_id = %workflow_id, name = %request.name, "Adding node");

    let create_request = CreateNodeRequest {
        id: request.id,
        name: request.name,
        node_type: request.node_type,
        order: request.order,
        leader_agent_id: request.leader_agent_id,
        worker_agent_id: request.worker_agent_id,
        position: request.position,
        data: request.data,
    };

    let workflow = state
        .workflow_service
        .add_node(&workflow_id, create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(workflow))
}

/// PATCH /workflows/:workflow_id/nodes/:node_id
pub async fn update_node(
    State(state): State<AppState>,
    Path((workflow_id, node_id)): Path<(String, String)>,
    Json(request): Json<UpdateNodeApiRequest>,
) -> Result<Json<Workflow>, ApiError> {
    debug!(workflow_id = %workflow_id, node_id = %node_id, "Updating node");

    let update_request = UpdateNodeRequest {
        name: request.name,
        node_type: request.node_type,
        order: request.order,
        leader_agent_id: request.leader_agent_id,
        worker_agent_id: request.worker_agent_id,
        position: request.position,
        data: request.data,
    };

    let workflow = state
        .workflow_service
        .update_node(&workflow_id, &node_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(workflow))
}

/// DELETE /workflows/:workflow_id/nodes/:node_id
pub async fn remove_node(
    State(state): State<AppState>,
    Path((workflow_id, node_id)): Path<(String, String)>,
) -> Result<Json<Workflow>, ApiError> {
    debug!(workflow_id = %workflow_id, node_id = %node_id, "Removing node");

    let workflow = state
        .workflow_service
        .remove_node(&workflow_id, &node_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(workflow))
}

/// PATCH /workflows/:workflow_id/nodes/:node_id/order
pub async fn reorder_node(
    State(state): State<AppState>,
    Path((workflow_id, node_id)): Path<(String, String)>,
    Json(request): Json<ReorderNodeApiRequest>,
) -> Result<Json<Workflow>, ApiError> {
    debug!(
        workflow_id = %workflow_id,
        node_id = %node_id,
        order = request.order,
        "Reordering node"
    );

    let update_request = UpdateNodeRequest {
        order: Some(request.order),
        ..UpdateNodeRequest::default()
    };

    let workflow = state
        .workflow_service
        .update_node(&workflow_id, &node_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(workflow))
}

/// POST /workflows/:workflow_id/execute
///
/// Runs only the first node in order.
pub async fn execute_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<RunWorkflowApiRequest>,
) -> Result<Json<ExecutionOutcome>, ApiError> {
    info!(workflow_id = %workflow_id, "Executing first workflow node");

    let outcome = state
        .execution_service
        .run(
            &workflow_id,
            request.user_id.as_deref(),
            request.input,
            ExecutionMode::SingleNode,
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(outcome))
}

/// POST /workflows/:workflow_id/execute-all
///
/// Runs every node in order until completion or first failure.
pub async fn execute_all_nodes(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<RunWorkflowApiRequest>,
) -> Result<Json<ExecutionOutcome>, ApiError> {
    info!(workflow_id = %workflow_id, "Executing all workflow nodes");

    let outcome = state
        .execution_service
        .run(
            &workflow_id,
            request.user_id.as_deref(),
            request.input,
            ExecutionMode::RunToCompletion,
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let request: CreateWorkflowApiRequest =
            serde_json::from_str(r#"{"name": "content pipeline"}"#).unwrap();

        assert_eq!(request.name, "content pipeline");
        assert!(!request.is_public);
        assert_eq!(request.team_leader_type, TeamLeaderType::Single);
    }

    #[test]
    fn test_create_request_multi_leader() {
        let request: CreateWorkflowApiRequest = serde_json::from_str(
            r#"{"name": "w", "team_leader_type": "MULTI", "is_public": true}"#,
        )
        .unwrap();

        assert_eq!(request.team_leader_type, TeamLeaderType::Multi);
        assert!(request.is_public);
    }

    #[test]
    fn test_update_request_clears_leader() {
        let request: UpdateWorkflowApiRequest =
            serde_json::from_str(r#"{"leader_agent_id": null}"#).unwrap();

        assert_eq!(request.leader_agent_id, Some(None));
        assert_eq!(request.description, None);
    }

    #[test]
    fn test_node_request_with_position() {
        let request: CreateNodeApiRequest = serde_json::from_str(
            r#"{"name": "draft", "worker_agent_id": "a-1", "position": {"x": 10.0, "y": 20.0}}"#,
        )
        .unwrap();

        assert_eq!(request.name, "draft");
        assert_eq!(request.position.unwrap().x, 10.0);
        assert!(request.order.is_none());
    }

    #[test]
    fn test_run_request_default_input() {
        let request: RunWorkflowApiRequest = serde_json::from_str(r#"{}"#).unwrap();

        assert!(request.input.is_none());
        assert!(request.user_id.is_none());
    }
}
