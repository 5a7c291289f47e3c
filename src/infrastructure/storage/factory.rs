//! Storage factory for runtime backend selection

use std::sync::Arc;

use sqlx::postgres::PgPool;

use crate::domain::document::ChunkRepository;
use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

use super::chunks::{InMemoryChunkRepository, PostgresChunkRepository};
use super::in_memory::InMemoryStorage;
use super::postgres::{connect_pool, PostgresConfig, PostgresStorage};

/// Supported storage backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Creates storage instances for every entity type from one backend
/// choice. The Postgres variant shares a single connection pool.
#[derive(Debug)]
pub enum StorageFactory {
    InMemory,
    Postgres(PgPool),
}

impl StorageFactory {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Connect a shared pool for a Postgres-backed factory
    pub async fn postgres(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = connect_pool(config).await?;
        Ok(Self::Postgres(pool))
    }

    /// Create storage for one entity type, creating its table if needed
    pub async fn create<E>(&self) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        match self {
            Self::InMemory => Ok(Arc::new(InMemoryStorage::<E>::new())),
            Self::Postgres(pool) => {
                let storage = PostgresStorage::<E>::new(pool.clone());
                storage.ensure_table().await?;
                Ok(Arc::new(storage))
            }
        }
    }

    /// Create the chunk repository matching this backend
    pub async fn create_chunk_repository(&self) -> Result<Arc<dyn ChunkRepository>, DomainError> {
        match self {
            Self::InMemory => Ok(Arc::new(InMemoryChunkRepository::new())),
            Self::Postgres(pool) => {
                let repository = PostgresChunkRepository::new(pool.clone());
                repository.ensure_table().await?;
                Ok(Arc::new(repository))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::team::{Team, TeamId};

    #[test]
    fn test_storage_type_parse() {
        assert_eq!(StorageType::parse("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::parse("in-memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::parse("Postgres"), Some(StorageType::Postgres));
        assert_eq!(StorageType::parse("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::parse("unknown"), None);
    }

    #[tokio::test]
    async fn test_in_memory_factory_creates_working_storage() {
        let factory = StorageFactory::in_memory();
        let storage = factory.create::<Team>().await.unwrap();

        storage
            .create(Team::new(TeamId::new("t-1").unwrap(), "Content"))
            .await
            .unwrap();

        assert_eq!(storage.count().await.unwrap(), 1);
    }
}
