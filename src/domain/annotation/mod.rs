//! Annotation domain: per-node feedback and confirmation records

mod confirm;
mod feedback;

pub use confirm::{AgentConfirm, AgentConfirmId, ConfirmStatus};
pub use feedback::{AgentFeedback, AgentFeedbackId};
