use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;
use crate::domain::workflow::WorkflowId;

define_id!(
    /// Validated workflow execution identifier
    WorkflowExecutionId,
    "WorkflowExecution"
);

/// Lifecycle of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One run of a workflow, tracked from RUNNING to a terminal status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    id: WorkflowExecutionId,
    workflow_id: WorkflowId,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default)]
    logs: Vec<String>,
    started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ended_at: Option<DateTime<Utc>>,
}

impl WorkflowExecution {
    pub fn new(id: WorkflowExecutionId, workflow_id: WorkflowId) -> Self {
        Self {
            id,
            workflow_id,
            user_id: None,
            status: ExecutionStatus::Running,
            input: None,
            output: None,
            error: None,
            logs: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn id(&self) -> &WorkflowExecutionId {
        &self.id
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn input(&self) -> Option<&serde_json::Value> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn append_log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    pub fn set_output(&mut self, output: serde_json::Value) {
        self.output = Some(output);
    }

    /// Apply a status transition. FAILED records the error; terminal
    /// states stamp the end time. Transitions are advisory, never rejected.
    pub fn update_status(&mut self, status: ExecutionStatus, error: Option<String>) {
        self.status = status;
        if status == ExecutionStatus::Failed {
            if let Some(error) = error {
                self.error = Some(error);
            }
        }
        if status.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
    }
}

impl StorageEntity for WorkflowExecution {
    type Key = WorkflowExecutionId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "workflow_executions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution() -> WorkflowExecution {
        WorkflowExecution::new(
            WorkflowExecutionId::new("e-1").unwrap(),
            WorkflowId::new("w-1").unwrap(),
        )
    }

    #[test]
    fn test_starts_running_without_end_time() {
        let exec = execution();
        assert_eq!(exec.status(), ExecutionStatus::Running);
        assert!(exec.ended_at().is_none());
        assert!(exec.error().is_none());
    }

    #[test]
    fn test_completed_stamps_end_time() {
        let mut exec = execution();
        exec.update_status(ExecutionStatus::Completed, None);

        assert_eq!(exec.status(), ExecutionStatus::Completed);
        assert!(exec.ended_at().is_some());
    }

    #[test]
    fn test_failed_records_error() {
        let mut exec = execution();
        exec.update_status(ExecutionStatus::Failed, Some("provider timeout".to_string()));

        assert_eq!(exec.status(), ExecutionStatus::Failed);
        assert_eq!(exec.error(), Some("provider timeout"));
        assert!(exec.ended_at().is_some());
    }

    #[test]
    fn test_error_is_not_recorded_for_success() {
        let mut exec = execution();
        exec.update_status(ExecutionStatus::Completed, Some("ignored".to_string()));

        assert!(exec.error().is_none());
    }
}
