//! HTTP route handlers, one module per resource

pub mod agents;
pub mod annotations;
pub mod brands;
pub mod conversations;
pub mod documents;
pub mod executions;
pub mod rag;
pub mod teams;
pub mod users;
pub mod workflows;

use serde::{Deserialize, Deserializer};

/// Deserializes a patch field into `Some(Some(v))` for a value,
/// `Some(None)` for an explicit `null`. Combined with
/// `#[serde(default)]`, an absent field stays `None`.
pub(crate) fn patch_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
