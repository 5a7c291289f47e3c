//! User management endpoints

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::User;
use crate::infrastructure::services::{CreateUserRequest, UpdateUserRequest};

use super::patch_field;

/// Request to create a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserApiRequest {
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
}

/// Partial update; `"name": null` clears the name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserApiRequest {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub name: Option<Option<String>>,
}

/// List users response
#[derive(Debug, Clone, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub total: usize,
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ListUsersResponse>, ApiError> {
    let users = state.user_service.list().await.map_err(ApiError::from)?;
    let total = users.len();

    Ok(Json(ListUsersResponse { users, total }))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserApiRequest>,
) -> Result<Json<User>, ApiError> {
    debug!(email = %request.email, "Creating user");

    let create_request = CreateUserRequest {
        id: request.id,
        email: request.email,
        name: request.name,
    };

    let user = state
        .user_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(user))
}

/// GET /users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .user_service
        .get(&user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", user_id)))?;

    Ok(Json(user))
}

/// PATCH /users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserApiRequest>,
) -> Result<Json<User>, ApiError> {
    debug!(user_id = %user_id, "Updating user");

    let update_request = UpdateUserRequest {
        email: request.email,
        name: request.name,
    };

    let user = state
        .user_service
        .update(&user_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(user))
}

/// DELETE /users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(user_id = %user_id, "Deleting user");

    let deleted = state
        .user_service
        .delete(&user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": deleted,
        "id": user_id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{"email": "ada@example.com", "name": "Ada"}"#;

        let request: CreateUserApiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.name.as_deref(), Some("Ada"));
        assert!(request.id.is_none());
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let cleared: UpdateUserApiRequest = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(cleared.name, Some(None));

        let untouched: UpdateUserApiRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(untouched.name, None);
    }
}
