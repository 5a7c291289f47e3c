//! Agent/brand identity payloads
//!
//! The identity blob arrives from clients in a known shape (mission,
//! guideline, relations) most of the time, but older records carry free-form
//! JSON. Both are accepted at the boundary; the structured shape is preferred.

use serde::{Deserialize, Serialize};

/// Known identity shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,

    #[serde(rename = "guideLine", skip_serializing_if = "Option::is_none")]
    pub guide_line: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<String>,
}

/// Identity payload: a structured profile or a free-form JSON escape hatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Profile(IdentityProfile),
    Unstructured(serde_json::Value),
}

impl Identity {
    /// Empty structured identity
    pub fn empty() -> Self {
        Self::Profile(IdentityProfile::default())
    }

    /// Structured identity with a mission statement
    pub fn with_mission(mission: impl Into<String>) -> Self {
        Self::Profile(IdentityProfile {
            mission: Some(mission.into()),
            ..IdentityProfile::default()
        })
    }

    /// Replace the mission, preserving everything else. Unstructured
    /// objects get their "mission" key overwritten; non-object payloads
    /// are promoted to a structured profile.
    pub fn with_updated_mission(self, mission: impl Into<String>) -> Self {
        match self {
            Self::Profile(mut profile) => {
                profile.mission = Some(mission.into());
                Self::Profile(profile)
            }
            Self::Unstructured(serde_json::Value::Object(mut map)) => {
                map.insert(
                    "mission".to_string(),
                    serde_json::Value::String(mission.into()),
                );
                Self::Unstructured(serde_json::Value::Object(map))
            }
            Self::Unstructured(_) => Self::with_mission(mission),
        }
    }

    pub fn mission(&self) -> Option<&str> {
        match self {
            Self::Profile(profile) => profile.mission.as_deref(),
            Self::Unstructured(value) => value.get("mission").and_then(|v| v.as_str()),
        }
    }

    pub fn guide_line(&self) -> Option<&str> {
        match self {
            Self::Profile(profile) => profile.guide_line.as_deref(),
            Self::Unstructured(value) => value.get("guideLine").and_then(|v| v.as_str()),
        }
    }

    pub fn relations(&self) -> Option<&str> {
        match self {
            Self::Profile(profile) => profile.relations.as_deref(),
            Self::Unstructured(value) => value.get("relations").and_then(|v| v.as_str()),
        }
    }

    /// Render the identity as JSON text for prompt composition
    pub fn to_prompt_text(&self) -> String {
        match self {
            Self::Profile(profile) => {
                serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string())
            }
            Self::Unstructured(value) => value.to_string(),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::empty()
    }
}
