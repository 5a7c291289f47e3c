//! Validated identifier newtypes shared by all entities

use super::DomainError;

/// Maximum length for entity identifiers
pub const MAX_ID_LENGTH: usize = 64;

/// Validate an identifier string: non-empty, bounded, no whitespace or control characters
pub fn validate_id(kind: &str, id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::invalid_id(format!("{} ID cannot be empty", kind)));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(DomainError::invalid_id(format!(
            "{} ID exceeds maximum length of {} characters",
            kind, MAX_ID_LENGTH
        )));
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DomainError::invalid_id(format!(
            "{} ID '{}' must not contain whitespace or control characters",
            kind, id
        )));
    }

    Ok(())
}

/// Defines a validated string-backed identifier newtype implementing
/// `StorageKey`, string conversions and UUID generation.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new validated identifier
            pub fn new(id: impl Into<String>) -> Result<Self, $crate::domain::DomainError> {
                let id = id.into();
                $crate::domain::id::validate_id($kind, &id)?;
                Ok(Self(id))
            }

            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl $crate::domain::storage::StorageKey for $name {
            fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use define_id;

#[cfg(test)]
mod tests {
    use super::*;

    define_id!(TestId, "Test");

    #[test]
    fn test_valid_ids() {
        assert!(TestId::new("agent-1").is_ok());
        assert!(TestId::new("0198c1c2-9f4b-7d11-a001-7be1c3a2f9d0").is_ok());
        assert!(TestId::new("a").is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert!(TestId::new("").is_err());
        assert!(TestId::new("has space").is_err());
        assert!(TestId::new("tab\there").is_err());
        assert!(TestId::new("a".repeat(MAX_ID_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_generate_is_valid() {
        let id = TestId::generate();
        assert!(TestId::new(id.as_str()).is_ok());
    }

    #[test]
    fn test_serialization_round_trip() {
        let id = TestId::new("node-7").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"node-7\"");

        let back: TestId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_deserialization_rejects_invalid() {
        let result: Result<TestId, _> = serde_json::from_str("\"has space\"");
        assert!(result.is_err());
    }
}
