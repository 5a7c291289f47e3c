//! Agent management and direct chat endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::agent::{Agent, AgentRole, AgentType, Identity};
use crate::infrastructure::services::{CreateAgentRequest, UpdateAgentRequest};

use super::patch_field;

/// Request to create an agent
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgentApiRequest {
    pub id: Option<String>,
    pub name: String,
    pub role: Option<AgentRole>,
    pub agent_type: Option<AgentType>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub prompt: Option<String>,
    pub identity: Option<Identity>,
    #[serde(default)]
    pub rag_docs: Vec<String>,
    pub parent_agent_id: Option<String>,
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    pub brand_id: Option<String>,
}

/// Partial update; `"parent_agent_id": null` detaches the agent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAgentApiRequest {
    pub name: Option<String>,
    pub role: Option<AgentRole>,
    pub agent_type: Option<AgentType>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub prompt: Option<String>,
    pub identity: Option<Identity>,
    pub rag_docs: Option<Vec<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub parent_agent_id: Option<Option<String>>,
}

/// Optional list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAgentsQuery {
    pub team_id: Option<String>,
    pub role: Option<AgentRole>,
    pub agent_type: Option<AgentType>,
}

/// List agents response
#[derive(Debug, Clone, Serialize)]
pub struct ListAgentsResponse {
    pub agents: Vec<Agent>,
    pub total: usize,
}

/// Request to chat with an agent directly
#[derive(Debug, Clone, Deserialize)]
pub struct AgentChatApiRequest {
    pub question: String,
}

/// Answer from a direct agent chat
#[derive(Debug, Clone, Serialize)]
pub struct AgentChatApiResponse {
    pub answer: String,
    pub model: String,
}

/// Request to replace an agent's mission statement
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMissionApiRequest {
    pub mission: String,
}

/// An agent's current mission statement, if one is set
#[derive(Debug, Clone, Serialize)]
pub struct MissionResponse {
    pub agent_id: String,
    pub mission: Option<String>,
}

/// Request to attach a retrieval document to an agent
#[derive(Debug, Clone, Deserialize)]
pub struct AddRagDocApiRequest {
    pub document_id: String,
}

/// GET /agents
pub async fn list_agents(
    State(state): State<AppState>,
    Query(query): Query<ListAgentsQuery>,
) -> Result<Json<ListAgentsResponse>, ApiError> {
    let agents = state
        .agent_service
        .search(query.team_id.as_deref(), query.role, query.agent_type)
        .await
        .map_err(ApiError::from)?;
    let total = agents.len();

    Ok(Json(ListAgentsResponse { agents, total }))
}

/// POST /agents
pub async fn create_agent(
    State(state): State<AppState>,
    Json(request): Json<CreateAgentApiRequest>,
) -> Result<Json<Agent>, ApiError> {
    debug!(name = %request.name, "Creating agent");

    let create_request = CreateAgentRequest {
        id: request.id,
        name: request.name,
        role: request.role,
        agent_type: request.agent_type,
        model: request.model,
        temperature: request.temperature,
        prompt: request.prompt,
        identity: request.identity,
        rag_docs: request.rag_docs,
        parent_agent_id: request.parent_agent_id,
        user_id: request.user_id,
        team_id: request.team_id,
        brand_id: request.brand_id,
    };

    let agent = state
        .agent_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(agent))
}

/// GET /agents/:agent_id
pub async fn get_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    let agent = state
        .agent_service
        .get(&agent_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Agent '{}' not found", agent_id)))?;

    Ok(Json(agent))
}

/// PATCH /agents/:agent_id
pub async fn update_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(request): Json<UpdateAgentApiRequest>,
) -> Result<Json<Agent>, ApiError> {
    debug!(agent_id = %agent_id, "Updating agent");

    let update_request = UpdateAgentRequest {
        name: request.name,
        role: request.role,
        agent_type: request.agent_type,
        model: request.model,
        temperature: request.temperature,
        prompt: request.prompt,
        identity: request.identity,
        rag_docs: request.rag_docs,
        parent_agent_id: request.parent_agent_id,
    };

    let agent = state
        .agent_service
        .update(&agent_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(agent))
}

/// DELETE /agents/:agent_id
pub async fn delete_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(agent_id = %agent_id, "Deleting agent");

    let deleted = state
        .agent_service
        .delete(&agent_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": deleted,
        "id": agent_id
    })))
}

/// POST /agents/:agent_id/chat
pub async fn chat_with_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(request): Json<AgentChatApiRequest>,
) -> Result<Json<AgentChatApiResponse>, ApiError> {
    debug!(agent_id = %agent_id, "Direct agent chat");

    let result = state
        .agent_service
        .chat(&agent_id, &request.question)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(AgentChatApiResponse {
        answer: result.answer,
        model: result.model,
    }))
}

/// GET /agents/:agent_id/children
pub async fn list_children(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<ListAgentsResponse>, ApiError> {
    let agents = state
        .agent_service
        .children(&agent_id)
        .await
        .map_err(ApiError::from)?;
    let total = agents.len();

    Ok(Json(ListAgentsResponse { agents, total }))
}

/// GET /agents/:agent_id/parent
///
/// Serializes as `null` for a root agent.
pub async fn get_parent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Option<Agent>>, ApiError> {
    let parent = state
        .agent_service
        .parent(&agent_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(parent))
}

/// GET /agents/:agent_id/mission
pub async fn get_mission(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<MissionResponse>, ApiError> {
    let agent = state
        .agent_service
        .get(&agent_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Agent '{}' not found", agent_id)))?;

    Ok(Json(MissionResponse {
        agent_id,
        mission: agent.identity().mission().map(String::from),
    }))
}

/// PATCH /agents/:agent_id/mission
pub async fn update_mission(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(request): Json<UpdateMissionApiRequest>,
) -> Result<Json<Agent>, ApiError> {
    debug!(agent_id = %agent_id, "Updating agent mission");

    let agent = state
        .agent_service
        .update_mission(&agent_id, request.mission)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(agent))
}

/// POST /agents/:agent_id/rag-docs
pub async fn add_rag_doc(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(request): Json<AddRagDocApiRequest>,
) -> Result<Json<Agent>, ApiError> {
    debug!(agent_id = %agent_id, document_id = %request.document_id, "Attaching rag doc");

    let agent = state
        .agent_service
        .add_rag_doc(&agent_id, &request.document_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(agent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{
            "name": "copywriter",
            "role": "ASSISTANT",
            "agent_type": "worker",
            "model": "gpt-4o",
            "temperature": 0.4,
            "rag_docs": ["d-1", "d-2"]
        }"#;

        let request: CreateAgentApiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "copywriter");
        assert_eq!(request.role, Some(AgentRole::Assistant));
        assert_eq!(request.agent_type, Some(AgentType::Worker));
        assert_eq!(request.rag_docs.len(), 2);
    }

    #[test]
    fn test_update_request_detach_parent() {
        let request: UpdateAgentApiRequest =
            serde_json::from_str(r#"{"parent_agent_id": null}"#).unwrap();

        assert_eq!(request.parent_agent_id, Some(None));
    }

    #[test]
    fn test_list_query_parses_enum_filters() {
        let query: ListAgentsQuery = serde_json::from_value(serde_json::json!({
            "team_id": "t-1",
            "agent_type": "leader-single"
        }))
        .unwrap();

        assert_eq!(query.team_id.as_deref(), Some("t-1"));
        assert_eq!(query.agent_type, Some(AgentType::LeaderSingle));
        assert!(query.role.is_none());
    }
}
