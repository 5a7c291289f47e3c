//! OpenAI-backed provider implementations

mod chat;
mod embeddings;
mod vector_store;

pub use chat::OpenAiChatProvider;
pub use embeddings::OpenAiEmbeddingProvider;
pub use vector_store::OpenAiVectorSearchProvider;

pub(crate) const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
