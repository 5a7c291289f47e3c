//! Agent domain: configured AI personas that can be invoked to produce text

mod entity;
mod identity;

pub use entity::{Agent, AgentId, AgentRole, AgentType};
pub use identity::{Identity, IdentityProfile};
