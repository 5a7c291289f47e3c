//! Execution domain: run records, agent sessions and per-node results

mod node_result;
mod record;
mod session;

pub use node_result::{NodeResult, NodeResultId, NodeResultStatus};
pub use record::{ExecutionStatus, WorkflowExecution, WorkflowExecutionId};
pub use session::{AgentSession, AgentSessionId, SessionStatus};

use serde::{Deserialize, Serialize};

/// How far a run should progress through the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Execute only the first node in order, then stop
    SingleNode,
    /// Execute every node until completion or first failure
    RunToCompletion,
}

/// Result of one run: the final execution record plus all node results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub execution: WorkflowExecution,
    pub node_results: Vec<NodeResult>,
}
