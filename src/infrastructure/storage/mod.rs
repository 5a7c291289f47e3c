//! Storage backend implementations

mod chunks;
mod factory;
mod in_memory;
mod postgres;

pub use chunks::{InMemoryChunkRepository, PostgresChunkRepository};
pub use factory::{StorageFactory, StorageType};
pub use in_memory::InMemoryStorage;
pub use postgres::{PostgresConfig, PostgresStorage};
