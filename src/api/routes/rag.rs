//! Retrieval-augmented answering endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::services::{RagRequest, RagSubject};

/// Subject kind the question is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Brand,
    Team,
}

/// Request for a grounded answer
#[derive(Debug, Clone, Deserialize)]
pub struct VectorSearchApiRequest {
    pub query: String,
    pub subject_id: String,
    pub subject_type: SubjectType,
    pub top_k: Option<usize>,
    #[serde(default)]
    pub chat_history: Vec<String>,
    pub rag_docs: Option<Vec<String>>,
}

/// One retrieved chunk with its score
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResponse {
    pub document_id: String,
    pub content: String,
    pub score: f32,
}

/// Grounded answer plus the retrieval context behind it
#[derive(Debug, Clone, Serialize)]
pub struct VectorSearchApiResponse {
    pub answer: String,
    pub model: String,
    pub candidates: Vec<CandidateResponse>,
}

/// POST /vector-search
pub async fn vector_search(
    State(state): State<AppState>,
    Json(request): Json<VectorSearchApiRequest>,
) -> Result<Json<VectorSearchApiResponse>, ApiError> {
    info!(subject_id = %request.subject_id, "Answering grounded question");

    let subject = match request.subject_type {
        SubjectType::Brand => RagSubject::Brand(request.subject_id),
        SubjectType::Team => RagSubject::Team(request.subject_id),
    };

    let mut rag_request =
        RagRequest::new(request.query, subject).with_chat_history(request.chat_history);
    if let Some(top_k) = request.top_k {
        rag_request = rag_request.with_top_k(top_k);
    }
    if let Some(rag_docs) = request.rag_docs {
        rag_request = rag_request.with_rag_docs(rag_docs);
    }

    let answer = state
        .rag_service
        .answer(rag_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(VectorSearchApiResponse {
        answer: answer.answer,
        model: answer.model,
        candidates: answer
            .candidates
            .into_iter()
            .map(|c| CandidateResponse {
                document_id: c.document_id.as_str().to_string(),
                content: c.content,
                score: c.score,
            })
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let json = r#"{
            "query": "What is the brand tone?",
            "subject_id": "b-1",
            "subject_type": "brand",
            "top_k": 3,
            "chat_history": ["hello"],
            "rag_docs": ["d-1"]
        }"#;

        let request: VectorSearchApiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.subject_type, SubjectType::Brand);
        assert_eq!(request.top_k, Some(3));
        assert_eq!(request.chat_history.len(), 1);
        assert_eq!(request.rag_docs.as_deref(), Some(["d-1".to_string()].as_slice()));
    }

    #[test]
    fn test_request_defaults() {
        let json = r#"{"query": "q", "subject_id": "t-1", "subject_type": "team"}"#;

        let request: VectorSearchApiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.subject_type, SubjectType::Team);
        assert!(request.top_k.is_none());
        assert!(request.chat_history.is_empty());
        assert!(request.rag_docs.is_none());
    }
}
