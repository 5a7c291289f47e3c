//! Team management endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::Team;
use crate::infrastructure::services::{CreateTeamRequest, UpdateTeamRequest};

use super::patch_field;

/// Request to create a team
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamApiRequest {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub brand_id: Option<String>,
    pub user_id: Option<String>,
}

/// Partial update; explicit `null` clears the field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeamApiRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub brand_id: Option<Option<String>>,
}

/// Optional list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTeamsQuery {
    pub brand_id: Option<String>,
}

/// Request to replace a team's retrieval allow-list
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRagDocsApiRequest {
    pub rag_docs: Vec<String>,
}

/// Request to append one document to the allow-list
#[derive(Debug, Clone, Deserialize)]
pub struct AddRagDocApiRequest {
    pub document_id: String,
}

/// A team's retrieval allow-list
#[derive(Debug, Clone, Serialize)]
pub struct RagDocsResponse {
    pub team_id: String,
    pub rag_docs: Vec<String>,
}

/// List teams response
#[derive(Debug, Clone, Serialize)]
pub struct ListTeamsResponse {
    pub teams: Vec<Team>,
    pub total: usize,
}

/// GET /teams
pub async fn list_teams(
    State(state): State<AppState>,
    Query(query): Query<ListTeamsQuery>,
) -> Result<Json<ListTeamsResponse>, ApiError> {
    let teams = match query.brand_id {
        Some(brand_id) => state
            .team_service
            .list_for_brand(&brand_id)
            .await
            .map_err(ApiError::from)?,
        None => state.team_service.list().await.map_err(ApiError::from)?,
    };
    let total = teams.len();

    Ok(Json(ListTeamsResponse { teams, total }))
}

/// POST /teams
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<Json<Team>, ApiError> {
    debug!(name = %request.name, "Creating team");

    let create_request = CreateTeamRequest {
        id: request.id,
        name: request.name,
        description: request.description,
        brand_id: request.brand_id,
        user_id: request.user_id,
    };

    let team = state
        .team_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(team))
}

/// GET /teams/:team_id
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    let team = state
        .team_service
        .get(&team_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Team '{}' not found", team_id)))?;

    Ok(Json(team))
}

/// PATCH /teams/:team_id
pub async fn update_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<UpdateTeamApiRequest>,
) -> Result<Json<Team>, ApiError> {
    debug!(team_id = %team_id, "Updating team");

    let update_request = UpdateTeamRequest {
        name: request.name,
        description: request.description,
        brand_id: request.brand_id,
    };

    let team = state
        .team_service
        .update(&team_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(team))
}

/// GET /teams/:team_id/rag-docs
pub async fn get_rag_docs(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<RagDocsResponse>, ApiError> {
    let team = state
        .team_service
        .get(&team_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Team '{}' not found", team_id)))?;

    Ok(Json(RagDocsResponse {
        team_id,
        rag_docs: team
            .rag_docs()
            .iter()
            .map(|d| d.as_str().to_string())
            .collect(),
    }))
}

/// PATCH /teams/:team_id/rag-docs
pub async fn update_rag_docs(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<UpdateRagDocsApiRequest>,
) -> Result<Json<Team>, ApiError> {
    debug!(team_id = %team_id, "Replacing team rag docs");

    let team = state
        .team_service
        .update_rag_docs(&team_id, request.rag_docs)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(team))
}

/// POST /teams/:team_id/rag-docs
pub async fn add_rag_doc(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<AddRagDocApiRequest>,
) -> Result<Json<Team>, ApiError> {
    debug!(team_id = %team_id, document_id = %request.document_id, "Attaching rag doc");

    let team = state
        .team_service
        .add_rag_doc(&team_id, &request.document_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(team))
}

/// DELETE /teams/:team_id
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(team_id = %team_id, "Deleting team");

    let deleted = state
        .team_service
        .delete(&team_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": deleted,
        "id": team_id
    })))
}
