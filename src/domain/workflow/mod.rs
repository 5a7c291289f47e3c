//! Workflow domain: ordered node pipelines executed by agents

mod entity;
mod node;

pub use entity::{TeamLeaderType, Workflow, WorkflowId};
pub use node::{Node, NodeId, NodePosition};
