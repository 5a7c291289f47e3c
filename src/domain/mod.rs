//! Domain layer: entities, identifiers, provider traits and storage contracts

pub mod agent;
pub mod annotation;
pub mod brand;
pub mod conversation;
pub mod document;
pub mod embedding;
mod error;
pub mod execution;
pub mod id;
pub mod llm;
pub mod storage;
pub mod team;
pub mod user;
pub mod vector_search;
pub mod workflow;

pub use error::DomainError;
