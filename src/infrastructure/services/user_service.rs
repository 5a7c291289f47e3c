//! User service - CRUD operations for platform accounts

use std::sync::Arc;

use crate::domain::storage::Storage;
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Request to create a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
}

impl CreateUserRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Request to update an existing user
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<Option<String>>,
}

impl UpdateUserRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = Some(name);
        self
    }
}

/// User service for CRUD operations
pub struct UserService {
    storage: Arc<dyn Storage<User>>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    pub fn new(storage: Arc<dyn Storage<User>>) -> Self {
        Self { storage }
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        self.storage.get(&UserId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.storage.list().await
    }

    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        if request.email.trim().is_empty() {
            return Err(DomainError::validation("User email cannot be empty"));
        }

        let user_id = match request.id {
            Some(id) => UserId::new(id)?,
            None => UserId::generate(),
        };

        let mut user = User::new(user_id, request.email);
        if let Some(name) = request.name {
            user = user.with_name(name);
        }

        self.storage.create(user).await
    }

    pub async fn update(&self, id: &str, request: UpdateUserRequest) -> Result<User, DomainError> {
        let user_id = UserId::new(id)?;

        let mut user = self
            .storage
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if let Some(email) = request.email {
            user.set_email(email);
        }

        if let Some(name) = request.name {
            user.set_name(name);
        }

        self.storage.update(user).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        self.storage.delete(&UserId::new(id)?).await
    }
}
