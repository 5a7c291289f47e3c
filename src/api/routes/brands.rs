//! Brand management endpoints

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::brand::Brand;
use crate::domain::document::{Document, DocumentRelation};
use crate::infrastructure::services::{
    CreateBrandRequest, DocGuideInput, RelationInput, UpdateBrandRequest,
};

use super::patch_field;

/// One relation edge in a brand payload
#[derive(Debug, Clone, Deserialize)]
pub struct RelationApiInput {
    pub from_id: String,
    pub to_id: String,
    pub relation_type: String,
    pub prompt: Option<String>,
    #[serde(default)]
    pub seq: i32,
}

impl From<RelationApiInput> for RelationInput {
    fn from(input: RelationApiInput) -> Self {
        Self {
            from_id: input.from_id,
            to_id: input.to_id,
            relation_type: input.relation_type,
            prompt: input.prompt,
            seq: input.seq,
        }
    }
}

/// Per-document guide text in a brand payload
#[derive(Debug, Clone, Deserialize)]
pub struct DocGuideApiInput {
    pub document_id: String,
    pub guide: String,
}

impl From<DocGuideApiInput> for DocGuideInput {
    fn from(input: DocGuideApiInput) -> Self {
        Self {
            document_id: input.document_id,
            guide: input.guide,
        }
    }
}

/// Request to create a brand with its document links and relations
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBrandApiRequest {
    pub id: Option<String>,
    pub name: String,
    pub mission: Option<String>,
    pub guide_line: Option<String>,
    pub user_id: Option<String>,
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub doc_guides: Vec<DocGuideApiInput>,
    #[serde(default)]
    pub relations: Vec<RelationApiInput>,
}

/// Partial update; explicit `null` clears the field, `relations`
/// replaces the brand's relation set wholesale
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBrandApiRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch_field")]
    pub mission: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub guide_line: Option<Option<String>>,
    #[serde(default)]
    pub doc_guides: Vec<DocGuideApiInput>,
    pub relations: Option<Vec<RelationApiInput>>,
}

/// Request to replace a brand's retrieval allow-list
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRagDocsApiRequest {
    pub rag_docs: Vec<String>,
}

/// Request to append one document to the allow-list
#[derive(Debug, Clone, Deserialize)]
pub struct AddRagDocApiRequest {
    pub document_id: String,
}

/// A brand's retrieval allow-list
#[derive(Debug, Clone, Serialize)]
pub struct RagDocsResponse {
    pub brand_id: String,
    pub rag_docs: Vec<String>,
}

/// List brands response
#[derive(Debug, Clone, Serialize)]
pub struct ListBrandsResponse {
    pub brands: Vec<Brand>,
    pub total: usize,
}

/// Brand with its linked documents and relations
#[derive(Debug, Clone, Serialize)]
pub struct BrandDetailResponse {
    pub brand: Brand,
    pub documents: Vec<Document>,
    pub relations: Vec<DocumentRelation>,
}

/// GET /brands
pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<Json<ListBrandsResponse>, ApiError> {
    let brands = state.brand_service.list().await.map_err(ApiError::from)?;
    let total = brands.len();

    Ok(Json(ListBrandsResponse { brands, total }))
}

/// POST /brands
pub async fn create_brand(
    State(state): State<AppState>,
    Json(request): Json<CreateBrandApiRequest>,
) -> Result<Json<Brand>, ApiError> {
    debug!(name = %request.name, "Creating brand");

    let create_request = CreateBrandRequest {
        id: request.id,
        name: request.name,
        mission: request.mission,
        guide_line: request.guide_line,
        user_id: request.user_id,
        document_ids: request.document_ids,
        doc_guides: request.doc_guides.into_iter().map(Into::into).collect(),
        relations: request.relations.into_iter().map(Into::into).collect(),
    };

    let brand = state
        .brand_service
        .create(create_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(brand))
}

/// GET /brands/:brand_id
pub async fn get_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
) -> Result<Json<BrandDetailResponse>, ApiError> {
    let brand = state
        .brand_service
        .get(&brand_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Brand '{}' not found", brand_id)))?;

    let documents = state
        .brand_service
        .documents(&brand_id)
        .await
        .map_err(ApiError::from)?;
    let relations = state
        .brand_service
        .relations(&brand_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BrandDetailResponse {
        brand,
        documents,
        relations,
    }))
}

/// PATCH /brands/:brand_id
pub async fn update_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
    Json(request): Json<UpdateBrandApiRequest>,
) -> Result<Json<Brand>, ApiError> {
    debug!(brand_id = %brand_id, "Updating brand");

    let update_request = UpdateBrandRequest {
        name: request.name,
        mission: request.mission,
        guide_line: request.guide_line,
        doc_guides: request.doc_guides.into_iter().map(Into::into).collect(),
        relations: request
            .relations
            .map(|relations| relations.into_iter().map(Into::into).collect()),
    };

    let brand = state
        .brand_service
        .update(&brand_id, update_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(brand))
}

/// GET /brands/:brand_id/rag-docs
pub async fn get_rag_docs(
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
) -> Result<Json<RagDocsResponse>, ApiError> {
    let brand = state
        .brand_service
        .get(&brand_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Brand '{}' not found", brand_id)))?;

    Ok(Json(RagDocsResponse {
        brand_id,
        rag_docs: brand
            .rag_docs()
            .iter()
            .map(|d| d.as_str().to_string())
            .collect(),
    }))
}

/// PATCH /brands/:brand_id/rag-docs
pub async fn update_rag_docs(
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
    Json(request): Json<UpdateRagDocsApiRequest>,
) -> Result<Json<Brand>, ApiError> {
    debug!(brand_id = %brand_id, "Replacing brand rag docs");

    let brand = state
        .brand_service
        .update_rag_docs(&brand_id, request.rag_docs)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(brand))
}

/// POST /brands/:brand_id/rag-docs
pub async fn add_rag_doc(
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
    Json(request): Json<AddRagDocApiRequest>,
) -> Result<Json<Brand>, ApiError> {
    debug!(brand_id = %brand_id, document_id = %request.document_id, "Attaching rag doc");

    let brand = state
        .brand_service
        .add_rag_doc(&brand_id, &request.document_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(brand))
}

/// DELETE /brands/:brand_id
pub async fn delete_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    debug!(brand_id = %brand_id, "Deleting brand");

    let deleted = state
        .brand_service
        .delete(&brand_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({
        "deleted": deleted,
        "id": brand_id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_with_relations() {
        let json = r#"{
            "name": "acme",
            "mission": "sell anvils",
            "document_ids": ["d-1"],
            "doc_guides": [{"document_id": "d-1", "guide": "tone: dry"}],
            "relations": [
                {"from_id": "d-1", "to_id": "d-2", "relation_type": "before-after", "seq": 1}
            ]
        }"#;

        let request: CreateBrandApiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "acme");
        assert_eq!(request.document_ids, vec!["d-1"]);
        assert_eq!(request.doc_guides[0].guide, "tone: dry");
        assert_eq!(request.relations[0].seq, 1);
        assert!(request.relations[0].prompt.is_none());
    }

    #[test]
    fn test_update_request_clears_mission() {
        let request: UpdateBrandApiRequest =
            serde_json::from_str(r#"{"mission": null}"#).unwrap();

        assert_eq!(request.mission, Some(None));
        assert_eq!(request.guide_line, None);
        assert!(request.relations.is_none());
    }
}
