use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::workflow::NodeId;

use super::{AgentSessionId, WorkflowExecutionId};

define_id!(
    /// Validated node result identifier
    NodeResultId,
    "NodeResult"
);

/// Outcome of a single node execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeResultStatus {
    Completed,
    Failed,
}

/// Append-only record of one node's execution. The output of a
/// completed result becomes the input of the next node in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    pub id: NodeResultId,
    pub workflow_execution_id: WorkflowExecutionId,
    pub node_id: NodeId,
    pub agent_session_id: AgentSessionId,
    pub status: NodeResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl NodeResult {
    pub fn completed(
        workflow_execution_id: WorkflowExecutionId,
        node_id: NodeId,
        agent_session_id: AgentSessionId,
        input: Option<serde_json::Value>,
        output: serde_json::Value,
    ) -> Self {
        Self {
            id: NodeResultId::generate(),
            workflow_execution_id,
            node_id,
            agent_session_id,
            status: NodeResultStatus::Completed,
            input,
            output: Some(output),
            created_at: Utc::now(),
        }
    }

    pub fn failed(
        workflow_execution_id: WorkflowExecutionId,
        node_id: NodeId,
        agent_session_id: AgentSessionId,
        input: Option<serde_json::Value>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: NodeResultId::generate(),
            workflow_execution_id,
            node_id,
            agent_session_id,
            status: NodeResultStatus::Failed,
            input,
            output: Some(serde_json::json!({ "error": error.into() })),
            created_at: Utc::now(),
        }
    }
}

impl StorageEntity for NodeResult {
    type Key = NodeResultId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "node_results"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (WorkflowExecutionId, NodeId, AgentSessionId) {
        (
            WorkflowExecutionId::new("e-1").unwrap(),
            NodeId::new("n-1").unwrap(),
            AgentSessionId::new("s-1").unwrap(),
        )
    }

    #[test]
    fn test_completed_result_carries_output() {
        let (exec, node, session) = ids();
        let result =
            NodeResult::completed(exec, node, session, None, serde_json::json!("draft text"));

        assert_eq!(result.status, NodeResultStatus::Completed);
        assert_eq!(result.output, Some(serde_json::json!("draft text")));
    }

    #[test]
    fn test_failed_result_wraps_error_message() {
        let (exec, node, session) = ids();
        let result = NodeResult::failed(exec, node, session, None, "no responsible agent");

        assert_eq!(result.status, NodeResultStatus::Failed);
        assert_eq!(
            result.output,
            Some(serde_json::json!({ "error": "no responsible agent" }))
        );
    }
}
