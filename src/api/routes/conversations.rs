//! Conversation read endpoints

use axum::extract::{Path, State};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::conversation::{Conversation, Message};

/// List conversations response
#[derive(Debug, Clone, Serialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<Conversation>,
    pub total: usize,
}

/// List messages response
#[derive(Debug, Clone, Serialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<Message>,
    pub total: usize,
}

/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<ListConversationsResponse>, ApiError> {
    let conversations = state
        .conversation_service
        .list()
        .await
        .map_err(ApiError::from)?;
    let total = conversations.len();

    Ok(Json(ListConversationsResponse {
        conversations,
        total,
    }))
}

/// GET /conversations/:conversation_id
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state
        .conversation_service
        .get(&conversation_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::not_found(format!("Conversation '{}' not found", conversation_id))
        })?;

    Ok(Json(conversation))
}

/// GET /conversations/:conversation_id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ListMessagesResponse>, ApiError> {
    let messages = state
        .conversation_service
        .messages(&conversation_id)
        .await
        .map_err(ApiError::from)?;
    let total = messages.len();

    Ok(Json(ListMessagesResponse { messages, total }))
}
