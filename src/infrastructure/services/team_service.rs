//! Team service - CRUD operations for agent teams

use std::sync::Arc;

use crate::domain::brand::{Brand, BrandId};
use crate::domain::document::DocumentId;
use crate::domain::storage::Storage;
use crate::domain::team::{Team, TeamId};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Request to create a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub brand_id: Option<String>,
    pub user_id: Option<String>,
}

impl CreateTeamRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            brand_id: None,
            user_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_brand(mut self, brand_id: impl Into<String>) -> Self {
        self.brand_id = Some(brand_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Request to update an existing team
#[derive(Debug, Clone, Default)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub brand_id: Option<Option<String>>,
}

impl UpdateTeamRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_brand(mut self, brand_id: Option<String>) -> Self {
        self.brand_id = Some(brand_id);
        self
    }
}

/// Team service for CRUD operations
pub struct TeamService {
    storage: Arc<dyn Storage<Team>>,
    brand_storage: Arc<dyn Storage<Brand>>,
}

impl std::fmt::Debug for TeamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamService").finish()
    }
}

impl TeamService {
    pub fn new(storage: Arc<dyn Storage<Team>>, brand_storage: Arc<dyn Storage<Brand>>) -> Self {
        Self {
            storage,
            brand_storage,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Team>, DomainError> {
        self.storage.get(&TeamId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<Team>, DomainError> {
        self.storage.list().await
    }

    /// Teams scoped to one brand
    pub async fn list_for_brand(&self, brand_id: &str) -> Result<Vec<Team>, DomainError> {
        let brand_id = BrandId::new(brand_id)?;
        let teams = self.storage.list().await?;
        Ok(teams
            .into_iter()
            .filter(|t| t.brand_id() == Some(&brand_id))
            .collect())
    }

    pub async fn create(&self, request: CreateTeamRequest) -> Result<Team, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Team name cannot be empty"));
        }

        let team_id = match request.id {
            Some(id) => TeamId::new(id)?,
            None => TeamId::generate(),
        };

        let mut team = Team::new(team_id, request.name);

        if let Some(description) = request.description {
            team = team.with_description(description);
        }

        if let Some(brand_id) = request.brand_id {
            let brand_id = BrandId::new(brand_id)?;
            if !self.brand_storage.exists(&brand_id).await? {
                return Err(DomainError::not_found(format!(
                    "Brand '{}' not found",
                    brand_id
                )));
            }
            team = team.with_brand(brand_id);
        }

        if let Some(user_id) = request.user_id {
            team = team.with_user(UserId::new(user_id)?);
        }

        self.storage.create(team).await
    }

    pub async fn update(&self, id: &str, request: UpdateTeamRequest) -> Result<Team, DomainError> {
        let team_id = TeamId::new(id)?;

        let mut team = self
            .storage
            .get(&team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))?;

        if let Some(name) = request.name {
            team.set_name(name);
        }

        if let Some(description) = request.description {
            team.set_description(description);
        }

        if let Some(brand_id) = request.brand_id {
            let brand_id = brand_id.map(BrandId::new).transpose()?;
            if let Some(ref brand_id) = brand_id {
                if !self.brand_storage.exists(brand_id).await? {
                    return Err(DomainError::not_found(format!(
                        "Brand '{}' not found",
                        brand_id
                    )));
                }
            }
            team.set_brand_id(brand_id);
        }

        self.storage.update(team).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        self.storage.delete(&TeamId::new(id)?).await
    }

    /// Replace the team's retrieval allow-list
    pub async fn update_rag_docs(
        &self,
        id: &str,
        rag_docs: Vec<String>,
    ) -> Result<Team, DomainError> {
        let team_id = TeamId::new(id)?;
        let mut team = self
            .storage
            .get(&team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))?;

        let rag_docs = rag_docs
            .into_iter()
            .map(DocumentId::new)
            .collect::<Result<Vec<_>, _>>()?;
        team.set_rag_docs(rag_docs);
        self.storage.update(team).await
    }

    pub async fn add_rag_doc(&self, id: &str, document_id: &str) -> Result<Team, DomainError> {
        let team_id = TeamId::new(id)?;
        let document_id = DocumentId::new(document_id)?;

        let mut team = self
            .storage
            .get(&team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))?;

        team.add_rag_doc(document_id);
        self.storage.update(team).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::mock::MockStorage;

    fn service_with_brand(brand: Option<Brand>) -> TeamService {
        let brand_storage = match brand {
            Some(brand) => MockStorage::new().with_entity(brand),
            None => MockStorage::new(),
        };
        TeamService::new(Arc::new(MockStorage::new()), Arc::new(brand_storage))
    }

    fn brand(id: &str) -> Brand {
        Brand::new(BrandId::new(id).unwrap(), "Acme")
    }

    #[tokio::test]
    async fn test_rag_docs_replace_and_append() {
        let service = service_with_brand(None);
        service
            .create(CreateTeamRequest::new("Growth").with_id("t-1"))
            .await
            .unwrap();

        let team = service
            .update_rag_docs("t-1", vec!["d-1".to_string()])
            .await
            .unwrap();
        assert_eq!(team.rag_docs().len(), 1);

        let team = service.add_rag_doc("t-1", "d-1").await.unwrap();
        assert_eq!(team.rag_docs().len(), 1);
    }

    #[tokio::test]
    async fn test_create_with_known_brand() {
        let service = service_with_brand(Some(brand("b-1")));

        let team = service
            .create(CreateTeamRequest::new("Content").with_brand("b-1"))
            .await
            .unwrap();

        assert_eq!(team.brand_id().map(|b| b.as_str()), Some("b-1"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_brand() {
        let service = service_with_brand(None);

        let result = service
            .create(CreateTeamRequest::new("Content").with_brand("b-404"))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_for_brand_filters() {
        let service = service_with_brand(Some(brand("b-1")));

        service
            .create(CreateTeamRequest::new("A").with_id("t-1").with_brand("b-1"))
            .await
            .unwrap();
        service
            .create(CreateTeamRequest::new("B").with_id("t-2"))
            .await
            .unwrap();

        let teams = service.list_for_brand("b-1").await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name(), "A");
    }
}
