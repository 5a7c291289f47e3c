//! Conversation domain: append-only message logs attached to executions

mod entity;
mod message;

pub use entity::{Conversation, ConversationId};
pub use message::{Message, MessageId, MessageRole};
