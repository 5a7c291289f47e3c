//! Storage entity traits

use std::fmt::Debug;

use serde::{Serialize, de::DeserializeOwned};

/// Trait for types usable as storage keys
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// Returns the key as a string for backends that key by string
    fn as_str(&self) -> &str;
}

/// Trait for types that can be persisted
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    /// The key type for this entity
    type Key: StorageKey;

    /// Returns the entity's key
    fn key(&self) -> &Self::Key;

    /// Table (or namespace) this entity type is stored under
    fn table_name() -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    struct TestKey(String);

    impl StorageKey for TestKey {
        fn as_str(&self) -> &str {
            &self.0
        }
    }

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct TestEntity {
        id: TestKey,
        name: String,
    }

    impl StorageEntity for TestEntity {
        type Key = TestKey;

        fn key(&self) -> &Self::Key {
            &self.id
        }

        fn table_name() -> &'static str {
            "test_entities"
        }
    }

    #[test]
    fn test_key_and_table() {
        let entity = TestEntity {
            id: TestKey("e-1".to_string()),
            name: "Test".to_string(),
        };
        assert_eq!(entity.key().as_str(), "e-1");
        assert_eq!(TestEntity::table_name(), "test_entities");
    }
}
