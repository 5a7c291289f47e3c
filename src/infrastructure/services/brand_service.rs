//! Brand service - brand CRUD plus document linking and relation sync

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::brand::{Brand, BrandId};
use crate::domain::document::{
    Document, DocumentId, DocumentMeta, DocumentOwner, DocumentRelation, RelationScope,
};
use crate::domain::storage::Storage;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// One relation edge supplied with a brand create/update
#[derive(Debug, Clone)]
pub struct RelationInput {
    pub from_id: String,
    pub to_id: String,
    pub relation_type: String,
    pub prompt: Option<String>,
    pub seq: i32,
}

/// A per-document guide text supplied with a brand create/update
#[derive(Debug, Clone)]
pub struct DocGuideInput {
    pub document_id: String,
    pub guide: String,
}

/// Request to create a new brand
#[derive(Debug, Clone)]
pub struct CreateBrandRequest {
    pub id: Option<String>,
    pub name: String,
    pub mission: Option<String>,
    pub guide_line: Option<String>,
    pub user_id: Option<String>,
    pub document_ids: Vec<String>,
    pub doc_guides: Vec<DocGuideInput>,
    pub relations: Vec<RelationInput>,
}

impl CreateBrandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            mission: None,
            guide_line: None,
            user_id: None,
            document_ids: Vec::new(),
            doc_guides: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    pub fn with_guide_line(mut self, guide_line: impl Into<String>) -> Self {
        self.guide_line = Some(guide_line.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_ids.push(document_id.into());
        self
    }

    pub fn with_doc_guide(mut self, document_id: impl Into<String>, guide: impl Into<String>) -> Self {
        self.doc_guides.push(DocGuideInput {
            document_id: document_id.into(),
            guide: guide.into(),
        });
        self
    }

    pub fn with_relation(mut self, relation: RelationInput) -> Self {
        self.relations.push(relation);
        self
    }
}

/// Request to update an existing brand
#[derive(Debug, Clone, Default)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub mission: Option<Option<String>>,
    pub guide_line: Option<Option<String>>,
    pub doc_guides: Vec<DocGuideInput>,
    pub relations: Option<Vec<RelationInput>>,
}

impl UpdateBrandRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mission(mut self, mission: Option<String>) -> Self {
        self.mission = Some(mission);
        self
    }

    pub fn with_guide_line(mut self, guide_line: Option<String>) -> Self {
        self.guide_line = Some(guide_line);
        self
    }

    pub fn with_doc_guide(mut self, document_id: impl Into<String>, guide: impl Into<String>) -> Self {
        self.doc_guides.push(DocGuideInput {
            document_id: document_id.into(),
            guide: guide.into(),
        });
        self
    }

    pub fn with_relations(mut self, relations: Vec<RelationInput>) -> Self {
        self.relations = Some(relations);
        self
    }
}

/// Brand service orchestrating brand rows, document metadata and relations
pub struct BrandService {
    storage: Arc<dyn Storage<Brand>>,
    document_storage: Arc<dyn Storage<Document>>,
    relation_storage: Arc<dyn Storage<DocumentRelation>>,
}

impl std::fmt::Debug for BrandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrandService").finish()
    }
}

impl BrandService {
    pub fn new(
        storage: Arc<dyn Storage<Brand>>,
        document_storage: Arc<dyn Storage<Document>>,
        relation_storage: Arc<dyn Storage<DocumentRelation>>,
    ) -> Self {
        Self {
            storage,
            document_storage,
            relation_storage,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Brand>, DomainError> {
        self.storage.get(&BrandId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<Brand>, DomainError> {
        self.storage.list().await
    }

    /// Create a brand, link supplied documents, apply doc guides and
    /// sync relations in one service call
    pub async fn create(&self, request: CreateBrandRequest) -> Result<Brand, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Brand name cannot be empty"));
        }

        let brand_id = match request.id {
            Some(id) => BrandId::new(id)?,
            None => BrandId::generate(),
        };

        let mut brand = Brand::new(brand_id.clone(), request.name);

        if let Some(mission) = request.mission {
            brand = brand.with_mission(mission);
        }

        if let Some(guide_line) = request.guide_line {
            brand = brand.with_guide_line(guide_line);
        }

        if let Some(user_id) = request.user_id {
            brand = brand.with_user(UserId::new(user_id)?);
        }

        let brand = self.storage.create(brand).await?;

        for document_id in &request.document_ids {
            self.verify_document(document_id).await?;
        }

        self.apply_doc_guides(&request.doc_guides).await?;
        self.sync_relations(&brand_id, request.relations).await?;

        Ok(brand)
    }

    pub async fn update(&self, id: &str, request: UpdateBrandRequest) -> Result<Brand, DomainError> {
        let brand_id = BrandId::new(id)?;

        let mut brand = self
            .storage
            .get(&brand_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Brand '{}' not found", id)))?;

        if let Some(name) = request.name {
            brand.set_name(name);
        }

        if let Some(mission) = request.mission {
            brand.set_mission(mission);
        }

        if let Some(guide_line) = request.guide_line {
            brand.set_guide_line(guide_line);
        }

        let brand = self.storage.update(brand).await?;

        self.apply_doc_guides(&request.doc_guides).await?;

        if let Some(relations) = request.relations {
            self.sync_relations(&brand_id, relations).await?;
        }

        Ok(brand)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        self.storage.delete(&BrandId::new(id)?).await
    }

    /// Replace the brand's retrieval allow-list
    pub async fn update_rag_docs(
        &self,
        id: &str,
        rag_docs: Vec<String>,
    ) -> Result<Brand, DomainError> {
        let brand_id = BrandId::new(id)?;
        let mut brand = self
            .storage
            .get(&brand_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Brand '{}' not found", id)))?;

        let rag_docs = rag_docs
            .into_iter()
            .map(DocumentId::new)
            .collect::<Result<Vec<_>, _>>()?;
        brand.set_rag_docs(rag_docs);
        self.storage.update(brand).await
    }

    pub async fn add_rag_doc(&self, id: &str, document_id: &str) -> Result<Brand, DomainError> {
        let brand_id = BrandId::new(id)?;
        let document_id = DocumentId::new(document_id)?;

        let mut brand = self
            .storage
            .get(&brand_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Brand '{}' not found", id)))?;

        brand.add_rag_doc(document_id);
        self.storage.update(brand).await
    }

    /// Documents owned by this brand
    pub async fn documents(&self, id: &str) -> Result<Vec<Document>, DomainError> {
        let brand_id = BrandId::new(id)?;
        let documents = self.document_storage.list().await?;
        Ok(documents
            .into_iter()
            .filter(|d| matches!(d.owner(), DocumentOwner::Brand(b) if b == &brand_id))
            .collect())
    }

    /// Relations scoped to this brand, ordered by seq
    pub async fn relations(&self, id: &str) -> Result<Vec<DocumentRelation>, DomainError> {
        let brand_id = BrandId::new(id)?;
        let mut relations: Vec<DocumentRelation> = self
            .relation_storage
            .list()
            .await?
            .into_iter()
            .filter(|r| matches!(&r.scope, RelationScope::Brand(b) if b == &brand_id))
            .collect();
        relations.sort_by_key(|r| r.seq);
        Ok(relations)
    }

    async fn verify_document(&self, document_id: &str) -> Result<DocumentId, DomainError> {
        let document_id = DocumentId::new(document_id)?;
        if !self.document_storage.exists(&document_id).await? {
            return Err(DomainError::not_found(format!(
                "Document '{}' not found",
                document_id
            )));
        }
        Ok(document_id)
    }

    async fn apply_doc_guides(&self, guides: &[DocGuideInput]) -> Result<(), DomainError> {
        for guide in guides {
            let document_id = self.verify_document(&guide.document_id).await?;
            let mut document = self
                .document_storage
                .get(&document_id)
                .await?
                .ok_or_else(|| {
                    DomainError::not_found(format!("Document '{}' not found", document_id))
                })?;

            document.set_metadata(Some(DocumentMeta::Guide {
                guide: guide.guide.clone(),
            }));
            self.document_storage.update(document).await?;
        }

        Ok(())
    }

    /// Replace the brand's relation set with the deduplicated input.
    /// Duplicate (from, to, type) triples collapse to the first entry.
    async fn sync_relations(
        &self,
        brand_id: &BrandId,
        relations: Vec<RelationInput>,
    ) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        let mut deduped = Vec::new();

        for relation in relations {
            let key = (
                relation.from_id.clone(),
                relation.to_id.clone(),
                relation.relation_type.clone(),
            );
            if seen.insert(key) {
                deduped.push(relation);
            }
        }

        let existing = self.relations(brand_id.as_str()).await?;
        for relation in existing {
            self.relation_storage.delete(&relation.id).await?;
        }

        debug!(brand_id = %brand_id, count = deduped.len(), "Syncing brand relations");

        for input in deduped {
            let from_id = self.verify_document(&input.from_id).await?;
            let to_id = self.verify_document(&input.to_id).await?;

            let mut relation = DocumentRelation::new(
                from_id,
                to_id,
                input.relation_type,
                RelationScope::Brand(brand_id.clone()),
            )
            .with_seq(input.seq);

            if let Some(prompt) = input.prompt {
                relation = relation.with_prompt(prompt);
            }

            self.relation_storage.create(relation).await?;
        }

        Ok(())
    }
}
