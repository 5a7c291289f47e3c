//! Vector store search abstraction

mod provider;

pub use provider::{ChunkCandidate, VectorSearchProvider};

#[cfg(test)]
pub use provider::mock;
