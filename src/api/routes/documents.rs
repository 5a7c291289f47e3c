//! Document, chunk and relation endpoints

use axum::extract::{Multipart, Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::agent::AgentId;
use crate::domain::brand::BrandId;
use crate::domain::document::{
    Document, DocumentChunk, DocumentMeta, DocumentOwner, DocumentRelation,
};
use crate::domain::team::TeamId;
use crate::infrastructure::services::{
    CreateDocumentRequest, CreateRelationRequest, OwnerRef, UpdateDocumentRequest,
};

use super::patch_field;

/// Owner reference in API payloads, mirroring the stored shape
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerApiRef {
    Team(String),
    Brand(String),
    Agent(String),
}

impl From<OwnerApiRef> for OwnerRef {
    fn from(owner: OwnerApiRef) -> Self {
        match owner {
            OwnerApiRef::Team(id) => Self::Team(id),
            OwnerApiRef::Brand(id) => Self::Brand(id),
            OwnerApiRef::Agent(id) => Self::Agent(id),
        }
    }
}

fn owner_from_parts(kind: &str, id: String) -> Result<OwnerRef, ApiError> {
    match kind {
        "team" => Ok(OwnerRef::Team(id)),
        "brand" => Ok(OwnerRef::Brand(id)),
        "agent" => Ok(OwnerRef::Agent(id)),
        other => Err(ApiError::bad_request(format!(
            "Unknown owner kind '{}'",
            other
        ))),
    }
}

fn document_owner_from_parts(kind: &str, id: String) -> Result<DocumentOwner, ApiError> {
    Ok(match kind {
        "team" => DocumentOwner::Team(TeamId::new(id).map_err(ApiError::from)?),
        "brand" => DocumentOwner::Brand(BrandId::new(id).map_err(ApiError::from)?),
        "agent" => DocumentOwner::Agent(AgentId::new(id).map_err(ApiError::from)?),
        other => {
            return Err(ApiError::bad_request(format!(
                "Unknown owner kind '{}'",
                other
            )));
        }
    })
}

/// Request to store a document
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentApiRequest {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub owner: OwnerApiRef,
    pub mimetype: Option<String>,
    pub size: Option<u64>,
    pub metadata: Option<DocumentMeta>,
    #[serde(default = "default_vectorize")]
    pub vectorize: bool,
}

fn default_vectorize() -> bool {
    true
}

/// Partial update; `"metadata": null` clears the metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentApiRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub metadata: Option<Option<DocumentMeta>>,
}

/// Optional owner filter for document lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDocumentsQuery {
    pub owner_kind: Option<String>,
    pub owner_id: Option<String>,
}

/// List documents response
#[derive(Debug, Clone, Serialize)]
pub struct ListDocumentsResponse {
    pub documents: Vec<Document>,
    pub total: usize,
}

/// List chunks response
#[derive(Debug, Clone, Serialize)]
pub struct ListChunksResponse {
    pub chunks: Vec<DocumentChunk>,
    pub total: usize,
}

/// Document bundled with every relation touching it
#[derive(Debug, Clone, Serialize)]
pub struct DocumentWithRelationsResponse {
    pub document: Document,
    pub relations: Vec<DocumentRelation>,
}

/// Request to create a document relation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelationApiRequest {
    pub from_id: String,
    pub to_id: String,
    pub relation_type: String,
    pub prompt: Option<String>,
    #[serde(default)]
    pub seq: i32,
    pub scope: OwnerApiRef,
}

/// Optional document filter for relation lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRelationsQuery {
    pub document_id: Option<String>,
}

/// List relations response
#[derive(Debug, Clone, Serialize)]
pub struct ListRelationsResponse {
    pub relations: Vec<DocumentRelation>,
    pub total: usize,
}

/// GET /documents
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<ListDocumentsResponse>, ApiError> {
    let documents = match (query.owner_kind, query.owner_id) {
        (Some(kind), Some(id)) => {
            let owner = document_owner_from_parts(&kind, id)?;
            state
                .document_service
                .list_for_owner(&owner)
                .await
                .map_err(ApiError::from)?
        }
        (None, None) => state
            .document_service
            .list()
            .await
            .map_err(ApiError::from)?,
        _ => {
            return Err(ApiError::bad_request(
                "Owner filter needs both 'owner_kind' and 'owner_id'",
            ));
        }
    };
    let total = documents.len();

    Ok(Json(ListDocumentsResponse { documents, total }))
}

/// POST /documents
pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentApiRequest>,
) -> Result<Json<Document>, ApiError> {
    debug!(title = %request.title, "Creating document");

    let create_request = CreateDocumentRequest {
        id: request.id,
        title: request.title,
        content: request.content,
        owner: request.owner.into(),
        mimetype: request.mimetype,
        size: request.size,
        metadata: request.metadata,
        vectorize: request.vectorize,
    };

    let document = state
        .document_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(document))
}

/// POST /documents/upload
///
/// Multipart form: a `file` part (treated as UTF-8 text) plus `owner_kind`,
/// `owner_id` and optional `title` / `vectorize` parts.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Document>, ApiError> {
    let mut title: Option<String> = None;
    let mut content: Option<String> = None;
    let mut mimetype: Option<String> = None;
    let mut size: Option<u64> = None;
    let mut owner_kind: Option<String> = None;
    let mut owner_id: Option<String> = None;
    let mut vectorize = true;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if title.is_none() {
                    title = field.file_name().map(|f| f.to_string());
                }
                mimetype = field.content_type().map(|c| c.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
                size = Some(bytes.len() as u64);
                content = Some(
                    String::from_utf8(bytes.to_vec())
                        .map_err(|_| ApiError::bad_request("File is not valid UTF-8 text"))?,
                );
            }
            "title" => {
                title = Some(read_text_field(field).await?);
            }
            "owner_kind" => {
                owner_kind = Some(read_text_field(field).await?);
            }
            "owner_id" => {
                owner_id = Some(read_text_field(field).await?);
            }
            "vectorize" => {
                let text = read_text_field(field).await?;
                vectorize = text
                    .parse::<bool>()
                    .map_err(|_| ApiError::bad_request("'vectorize' must be true or false"))?;
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("Missing 'file' part"))?;
    let title = title.ok_or_else(|| ApiError::bad_request("Missing 'title' or file name"))?;
    let owner_kind =
        owner_kind.ok_or_else(|| ApiError::bad_request("Missing 'owner_kind' part"))?;
    let owner_id = owner_id.ok_or_else(|| ApiError::bad_request("Missing 'owner_id' part"))?;
    let owner = owner_from_parts(&owner_kind, owner_id)?;

    debug!(title = %title, "Uploading document");

    let mut create_request = CreateDocumentRequest::new(title, content, owner);
    create_request.mimetype = mimetype;
    create_request.size = size;
    create_request.vectorize = vectorize;

    let document = state
        .document_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(document))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read form field: {}", e)))
}

/// GET /documents/:document_id
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .document_service
        .get(&document_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Document '{}' not found", document_id)))?;

    Ok(Json(document))
}

/// PATCH /documents/:document_id
pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(request): Json<UpdateDocumentApiRequest>,
) -> Result<Json<Document>, ApiError> {
    debug!(document_id = %document_id, "Updating document");

    let update_request = UpdateDocumentRequest {
        title: request.title,
        content: request.content,
        metadata: request.metadata,
    };

    let document = state
        .document_service
        .update(&document_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(document))
}

/// DELETE /documents/:document_id
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(document_id = %document_id, "Deleting document");

    let deleted = state
        .document_service
        .delete(&document_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": deleted,
        "id": document_id
    })))
}

/// GET /documents/:document_id/chunks
pub async fn list_chunks(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<ListChunksResponse>, ApiError> {
    let chunks = state
        .document_service
        .chunks(&document_id)
        .await
        .map_err(ApiError::from)?;
    let total = chunks.len();

    Ok(Json(ListChunksResponse { chunks, total }))
}

/// POST /documents/:document_id/regen-chunks
pub async fn regenerate_chunks(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    debug!(document_id = %document_id, "Regenerating chunks");

    let document = state
        .document_service
        .regenerate_chunks(&document_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(document))
}

/// GET /documents/:document_id/with-relations
pub async fn get_with_relations(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentWithRelationsResponse>, ApiError> {
    let document = state
        .document_service
        .get(&document_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Document '{}' not found", document_id)))?;

    let relations = state
        .document_service
        .relations_for_document(&document_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DocumentWithRelationsResponse {
        document,
        relations,
    }))
}

/// GET /document-relations
pub async fn list_relations(
    State(state): State<AppState>,
    Query(query): Query<ListRelationsQuery>,
) -> Result<Json<ListRelationsResponse>, ApiError> {
    let relations = match query.document_id {
        Some(document_id) => state
            .document_service
            .relations_for_document(&document_id)
            .await
            .map_err(ApiError::from)?,
        None => state
            .document_service
            .list_relations()
            .await
            .map_err(ApiError::from)?,
    };
    let total = relations.len();

    Ok(Json(ListRelationsResponse { relations, total }))
}

/// POST /document-relations
pub async fn create_relation(
    State(state): State<AppState>,
    Json(request): Json<CreateRelationApiRequest>,
) -> Result<Json<DocumentRelation>, ApiError> {
    debug!(
        from_id = %request.from_id,
        to_id = %request.to_id,
        "Creating document relation"
    );

    let create_request = CreateRelationRequest {
        from_id: request.from_id,
        to_id: request.to_id,
        relation_type: request.relation_type,
        prompt: request.prompt,
        seq: request.seq,
        scope: request.scope.into(),
    };

    let relation = state
        .document_service
        .create_relation(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(relation))
}

/// DELETE /document-relations/:relation_id
pub async fn delete_relation(
    State(state): State<AppState>,
    Path(relation_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(relation_id = %relation_id, "Deleting document relation");

    let deleted = state
        .document_service
        .delete_relation(&relation_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": deleted,
        "id": relation_id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{
            "title": "brand voice",
            "content": "Write plainly.",
            "owner": {"kind": "brand", "id": "b-1"},
            "metadata": {"guide": "tone reference"}
        }"#;

        let request: CreateDocumentApiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.title, "brand voice");
        assert!(matches!(request.owner, OwnerApiRef::Brand(ref id) if id == "b-1"));
        assert!(request.vectorize);
        assert_eq!(
            request.metadata.as_ref().and_then(|m| m.guide()),
            Some("tone reference")
        );
    }

    #[test]
    fn test_create_request_skip_vectorize() {
        let json = r#"{
            "title": "scratch",
            "content": "notes",
            "owner": {"kind": "team", "id": "t-1"},
            "vectorize": false
        }"#;

        let request: CreateDocumentApiRequest = serde_json::from_str(json).unwrap();
        assert!(!request.vectorize);
    }

    #[test]
    fn test_update_request_clears_metadata() {
        let request: UpdateDocumentApiRequest =
            serde_json::from_str(r#"{"metadata": null}"#).unwrap();

        assert_eq!(request.metadata, Some(None));
        assert!(request.content.is_none());
    }

    #[test]
    fn test_relation_request_deserialization() {
        let json = r#"{
            "from_id": "d-1",
            "to_id": "d-2",
            "relation_type": "before-after",
            "seq": 3,
            "scope": {"kind": "agent", "id": "a-1"}
        }"#;

        let request: CreateRelationApiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.seq, 3);
        assert!(matches!(request.scope, OwnerApiRef::Agent(ref id) if id == "a-1"));
    }

    #[test]
    fn test_owner_from_parts_rejects_unknown_kind() {
        let err = owner_from_parts("org", "o-1".to_string()).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
