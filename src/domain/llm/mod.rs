//! Chat completion provider abstraction

mod provider;

pub use provider::{ChatMessage, ChatProvider, ChatRequest, ChatResponse, ChatRole};

#[cfg(test)]
pub use provider::mock;
