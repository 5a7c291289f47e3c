//! Workflow execution engine
//!
//! Runs a workflow's nodes strictly in order, chaining each node's
//! output into the next node's context. One engine serves both the
//! single-node and run-to-completion entry points through
//! [`ExecutionMode`].

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::domain::agent::{Agent, AgentId};
use crate::domain::conversation::MessageRole;
use crate::domain::execution::{
    AgentSession, AgentSessionId, ExecutionMode, ExecutionOutcome, ExecutionStatus, NodeResult,
    SessionStatus, WorkflowExecution, WorkflowExecutionId,
};
use crate::domain::llm::{ChatMessage, ChatProvider, ChatRequest};
use crate::domain::storage::Storage;
use crate::domain::user::UserId;
use crate::domain::workflow::{Node, Workflow, WorkflowId};
use crate::domain::DomainError;

use super::conversation_service::{ConversationService, SaveMessageRequest};

/// Runs workflows and tracks their execution records
pub struct ExecutionService {
    workflow_storage: Arc<dyn Storage<Workflow>>,
    agent_storage: Arc<dyn Storage<Agent>>,
    execution_storage: Arc<dyn Storage<WorkflowExecution>>,
    session_storage: Arc<dyn Storage<AgentSession>>,
    node_result_storage: Arc<dyn Storage<NodeResult>>,
    chat_provider: Arc<dyn ChatProvider>,
    conversations: Arc<ConversationService>,
}

impl std::fmt::Debug for ExecutionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionService").finish()
    }
}

impl ExecutionService {
    pub fn new(
        workflow_storage: Arc<dyn Storage<Workflow>>,
        agent_storage: Arc<dyn Storage<Agent>>,
        execution_storage: Arc<dyn Storage<WorkflowExecution>>,
        session_storage: Arc<dyn Storage<AgentSession>>,
        node_result_storage: Arc<dyn Storage<NodeResult>>,
        chat_provider: Arc<dyn ChatProvider>,
        conversations: Arc<ConversationService>,
    ) -> Self {
        Self {
            workflow_storage,
            agent_storage,
            execution_storage,
            session_storage,
            node_result_storage,
            chat_provider,
            conversations,
        }
    }

    /// Run a workflow. Nodes execute in ascending order; a node's output
    /// becomes the context for the next one. The first node failure marks
    /// the execution FAILED and skips the remaining nodes. Node failures
    /// surface through the returned execution record, not as an `Err`.
    /// In single-node mode only the first node runs and the execution
    /// is left RUNNING.
    pub async fn run(
        &self,
        workflow_id: &str,
        user_id: Option<&str>,
        input: Option<Value>,
        mode: ExecutionMode,
    ) -> Result<ExecutionOutcome, DomainError> {
        let workflow_id = WorkflowId::new(workflow_id)?;
        let workflow = self
            .workflow_storage
            .get(&workflow_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Workflow '{}' not found", workflow_id))
            })?;

        if workflow.nodes().is_empty() {
            return Err(DomainError::invalid_state(format!(
                "Workflow '{}' has no nodes to execute",
                workflow_id
            )));
        }

        // The single-leader first/last rule is checked at run time;
        // node appends accept intermediate shapes.
        workflow.validate_leader_topology()?;

        let user_id = user_id.map(UserId::new).transpose()?;

        let mut execution =
            WorkflowExecution::new(WorkflowExecutionId::generate(), workflow_id.clone());
        if let Some(user_id) = &user_id {
            execution = execution.with_user(user_id.clone());
        }
        if let Some(input) = &input {
            execution = execution.with_input(input.clone());
        }
        let mut execution = self.execution_storage.create(execution).await?;

        info!(
            workflow_id = %workflow_id,
            execution_id = %execution.id(),
            ?mode,
            "Starting workflow execution"
        );

        let conversation = self
            .conversations
            .create_for_execution(
                execution.id(),
                user_id.as_ref(),
                format!("Workflow run #{}", execution.id()),
            )
            .await?;
        self.conversations
            .save_message(
                SaveMessageRequest::new(
                    conversation.id.as_str(),
                    MessageRole::System,
                    format!("Executing workflow '{}'", workflow.name()),
                )
                .with_execution(execution.id().as_str()),
            )
            .await?;

        let nodes: Vec<Node> = workflow.nodes_in_order().into_iter().cloned().collect();
        let mut node_results = Vec::new();
        let mut context = input;

        for node in &nodes {
            execution.append_log(format!("Executing node '{}'", node.name()));

            let outcome = self
                .run_node(&mut execution, &conversation.id, node, context.take())
                .await?;

            match outcome {
                NodeOutcome::Completed(result) => {
                    context = result.output.clone();
                    node_results.push(result);
                }
                NodeOutcome::Failed { result, error } => {
                    warn!(
                        execution_id = %execution.id(),
                        node_id = %node.id(),
                        error,
                        "Node failed, aborting execution"
                    );
                    execution.append_log(format!("Node '{}' failed: {}", node.name(), error));
                    execution.update_status(ExecutionStatus::Failed, Some(error));
                    if let Some(result) = result {
                        node_results.push(result);
                    }
                    let execution = self.execution_storage.update(execution).await?;
                    return Ok(ExecutionOutcome { execution, node_results });
                }
            }

            // Single-node mode stops here; the execution stays running.
            if mode == ExecutionMode::SingleNode {
                let execution = self.execution_storage.update(execution).await?;
                return Ok(ExecutionOutcome { execution, node_results });
            }
        }

        if let Some(output) = context {
            execution.set_output(output);
        }
        execution.update_status(ExecutionStatus::Completed, None);
        let execution = self.execution_storage.update(execution).await?;

        info!(execution_id = %execution.id(), "Workflow execution completed");

        Ok(ExecutionOutcome { execution, node_results })
    }

    async fn run_node(
        &self,
        execution: &mut WorkflowExecution,
        conversation_id: &crate::domain::conversation::ConversationId,
        node: &Node,
        context: Option<Value>,
    ) -> Result<NodeOutcome, DomainError> {
        let Some(agent_id) = node.responsible_agent() else {
            return Ok(NodeOutcome::Failed {
                result: None,
                error: format!("Node '{}' has no responsible agent", node.name()),
            });
        };

        let Some(agent) = self.agent_storage.get(agent_id).await? else {
            return Ok(NodeOutcome::Failed {
                result: None,
                error: format!("Agent '{}' not found for node '{}'", agent_id, node.name()),
            });
        };

        let mut session = AgentSession::new(AgentSessionId::generate(), agent_id.clone());
        if let Some(user_id) = execution.user_id() {
            session = session.with_user(user_id.clone());
        }
        let mut session = self.session_storage.create(session).await?;

        let prompt = compose_node_prompt(&agent, node, context.as_ref());
        session.append_message(prompt.clone());

        debug!(
            node_id = %node.id(),
            agent_id = %agent_id,
            model = agent.model(),
            "Dispatching node to agent"
        );

        let request = ChatRequest {
            model: agent.model().to_string(),
            messages: vec![
                ChatMessage::system("You are an AI agent executing one step of a workflow."),
                ChatMessage::user(prompt.clone()),
            ],
            temperature: agent.temperature(),
        };

        match self.chat_provider.chat(request).await {
            Ok(response) => {
                session.append_message(response.content.clone());
                session.set_status(SessionStatus::Completed);
                let session = self.session_storage.update(session).await?;

                self.conversations
                    .save_message(
                        SaveMessageRequest::new(
                            conversation_id.as_str(),
                            MessageRole::Assistant,
                            response.content.clone(),
                        )
                        .with_node(node.id().as_str())
                        .with_agent(agent_id.as_str())
                        .with_execution(execution.id().as_str()),
                    )
                    .await?;

                let result = NodeResult::completed(
                    execution.id().clone(),
                    node.id().clone(),
                    session.id().clone(),
                    context,
                    Value::String(response.content),
                );
                let result = self.node_result_storage.create(result).await?;
                Ok(NodeOutcome::Completed(result))
            }
            Err(error) => {
                session.set_status(SessionStatus::Failed);
                let session = self.session_storage.update(session).await?;

                let message = error.to_string();
                let result = NodeResult::failed(
                    execution.id().clone(),
                    node.id().clone(),
                    session.id().clone(),
                    context,
                    message.clone(),
                );
                let result = self.node_result_storage.create(result).await?;
                Ok(NodeOutcome::Failed { result: Some(result), error: message })
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<WorkflowExecution>, DomainError> {
        self.execution_storage.get(&WorkflowExecutionId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<WorkflowExecution>, DomainError> {
        self.execution_storage.list().await
    }

    /// Executions of one workflow, newest first
    pub async fn list_for_workflow(
        &self,
        workflow_id: &str,
    ) -> Result<Vec<WorkflowExecution>, DomainError> {
        let workflow_id = WorkflowId::new(workflow_id)?;

        let mut executions: Vec<WorkflowExecution> = self
            .execution_storage
            .list()
            .await?
            .into_iter()
            .filter(|e| e.workflow_id() == &workflow_id)
            .collect();
        executions.sort_by_key(|e| std::cmp::Reverse(e.started_at()));

        Ok(executions)
    }

    /// Apply an external status update to an execution record
    pub async fn update_status(
        &self,
        id: &str,
        status: ExecutionStatus,
        error: Option<String>,
    ) -> Result<WorkflowExecution, DomainError> {
        let execution_id = WorkflowExecutionId::new(id)?;
        let mut execution = self
            .execution_storage
            .get(&execution_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Workflow execution '{}' not found", id))
            })?;

        execution.update_status(status, error);
        self.execution_storage.update(execution).await
    }

    /// Node results of one execution in the order they were produced
    pub async fn node_results(&self, execution_id: &str) -> Result<Vec<NodeResult>, DomainError> {
        let execution_id = WorkflowExecutionId::new(execution_id)?;

        let mut results: Vec<NodeResult> = self
            .node_result_storage
            .list()
            .await?
            .into_iter()
            .filter(|r| r.workflow_execution_id == execution_id)
            .collect();
        results.sort_by_key(|r| r.created_at);

        Ok(results)
    }

    /// Agent session lookup for execution inspection endpoints
    pub async fn session(&self, id: &str) -> Result<Option<AgentSession>, DomainError> {
        self.session_storage.get(&AgentSessionId::new(id)?).await
    }
}

enum NodeOutcome {
    Completed(NodeResult),
    Failed {
        result: Option<NodeResult>,
        error: String,
    },
}

/// Prompt for one node: role, configured instructions, identity, task and
/// the running context carried over from the previous node
fn compose_node_prompt(agent: &Agent, node: &Node, context: Option<&Value>) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("[Agent role]\n{:?}\n\n", agent.role()));

    if !agent.prompt().is_empty() {
        prompt.push_str(&format!("[Agent instructions]\n{}\n\n", agent.prompt()));
    }

    let identity = agent.identity().to_prompt_text();
    if !identity.is_empty() {
        prompt.push_str(&format!("[Agent identity]\n{}\n\n", identity));
    }

    prompt.push_str(&format!("[Task]\n{}\n\n", node.name()));

    if let Some(data) = node.data() {
        prompt.push_str(&format!("[Task data]\n{}\n\n", data));
    }

    let context = context.cloned().unwrap_or_else(|| json!(null));
    prompt.push_str(&format!("[Context]\n{}", context));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::NodeResultStatus;
    use crate::domain::llm::mock::MockChatProvider;
    use crate::domain::storage::mock::MockStorage;
    use crate::domain::workflow::{NodeId, TeamLeaderType};

    struct Fixture {
        service: ExecutionService,
        provider: Arc<MockChatProvider>,
        conversations: Arc<ConversationService>,
        executions: Arc<MockStorage<WorkflowExecution>>,
    }

    fn fixture(workflows: Vec<Workflow>, agents: Vec<Agent>, provider: MockChatProvider) -> Fixture {
        let mut workflow_storage = MockStorage::new();
        for w in workflows {
            workflow_storage = workflow_storage.with_entity(w);
        }
        let mut agent_storage = MockStorage::new();
        for a in agents {
            agent_storage = agent_storage.with_entity(a);
        }

        let provider = Arc::new(provider);
        let conversations = Arc::new(ConversationService::new(
            Arc::new(MockStorage::new()),
            Arc::new(MockStorage::new()),
        ));
        let executions = Arc::new(MockStorage::new());

        Fixture {
            service: ExecutionService::new(
                Arc::new(workflow_storage),
                Arc::new(agent_storage),
                executions.clone(),
                Arc::new(MockStorage::new()),
                Arc::new(MockStorage::new()),
                provider.clone(),
                conversations.clone(),
            ),
            provider,
            conversations,
            executions,
        }
    }

    fn agent(id: &str) -> Agent {
        Agent::new(AgentId::new(id).unwrap(), format!("Agent {}", id))
    }

    fn node(id: &str, order: i32, agent_id: &str) -> Node {
        Node::new(NodeId::new(id).unwrap(), format!("Node {}", id), order)
            .with_worker_agent(AgentId::new(agent_id).unwrap())
    }

    fn workflow(id: &str, nodes: Vec<Node>) -> Workflow {
        let mut workflow = Workflow::new(WorkflowId::new(id).unwrap(), "Campaign")
            .with_leader_type(TeamLeaderType::Multi);
        for node in nodes {
            workflow.add_node(node);
        }
        workflow
    }

    fn single_leader_workflow(id: &str, leader: &str, nodes: Vec<Node>) -> Workflow {
        let mut workflow = Workflow::new(WorkflowId::new(id).unwrap(), "Campaign")
            .with_leader_agent(AgentId::new(leader).unwrap());
        for node in nodes {
            workflow.add_node(node);
        }
        workflow
    }

    fn leader_node(id: &str, order: i32, agent_id: &str) -> Node {
        Node::new(NodeId::new(id).unwrap(), format!("Node {}", id), order)
            .with_leader_agent(AgentId::new(agent_id).unwrap())
    }

    #[tokio::test]
    async fn test_missing_workflow_is_not_found() {
        let fixture = fixture(vec![], vec![], MockChatProvider::new());

        let result = fixture
            .service
            .run("w-missing", None, None, ExecutionMode::RunToCompletion)
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_workflow_without_nodes_is_invalid_state() {
        let fixture = fixture(vec![workflow("w-1", vec![])], vec![], MockChatProvider::new());

        let result = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_nodes_run_in_ascending_order() {
        let fixture = fixture(
            vec![workflow(
                "w-1",
                vec![node("n-c", 3, "a-1"), node("n-a", 1, "a-1"), node("n-b", 2, "a-1")],
            )],
            vec![agent("a-1")],
            MockChatProvider::new(),
        );

        let outcome = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        let order: Vec<&str> = outcome
            .node_results
            .iter()
            .map(|r| r.node_id.as_str())
            .collect();
        assert_eq!(order, vec!["n-a", "n-b", "n-c"]);
        assert_eq!(outcome.execution.status(), ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn test_output_chains_into_next_node_context() {
        let fixture = fixture(
            vec![workflow("w-1", vec![node("n-1", 0, "a-1"), node("n-2", 1, "a-1")])],
            vec![agent("a-1")],
            MockChatProvider::new().with_reply("draft").with_reply("polished"),
        );

        let outcome = fixture
            .service
            .run("w-1", None, Some(json!("brief")), ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        assert_eq!(outcome.node_results[0].input, Some(json!("brief")));
        assert_eq!(outcome.node_results[1].input, Some(json!("draft")));
        assert_eq!(outcome.execution.output(), Some(&json!("polished")));

        let second_prompt = &fixture.provider.request_at(1).messages[1].content;
        assert!(second_prompt.contains("draft"));
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_nodes() {
        let fixture = fixture(
            vec![workflow(
                "w-1",
                vec![node("n-1", 0, "a-1"), node("n-2", 1, "a-1"), node("n-3", 2, "a-1")],
            )],
            vec![agent("a-1")],
            MockChatProvider::new()
                .with_reply("ok")
                .with_error(DomainError::provider("openai", "rate limited")),
        );

        let outcome = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        assert_eq!(outcome.execution.status(), ExecutionStatus::Failed);
        assert!(outcome.execution.error().is_some());
        assert_eq!(outcome.node_results.len(), 2);
        assert_eq!(outcome.node_results[0].status, NodeResultStatus::Completed);
        assert_eq!(outcome.node_results[1].status, NodeResultStatus::Failed);
        assert_eq!(fixture.provider.request_count(), 2);
    }

    #[tokio::test]
    async fn test_node_without_agent_fails_execution() {
        let orphan = Node::new(NodeId::new("n-1").unwrap(), "Orphan", 0);
        let fixture = fixture(
            vec![workflow("w-1", vec![orphan])],
            vec![],
            MockChatProvider::new(),
        );

        let outcome = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        assert_eq!(outcome.execution.status(), ExecutionStatus::Failed);
        assert!(outcome.execution.error().unwrap().contains("no responsible agent"));
        assert!(outcome.node_results.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_agent_fails_execution() {
        let fixture = fixture(
            vec![workflow("w-1", vec![node("n-1", 0, "a-ghost")])],
            vec![],
            MockChatProvider::new(),
        );

        let outcome = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        assert_eq!(outcome.execution.status(), ExecutionStatus::Failed);
        assert!(outcome.execution.error().unwrap().contains("a-ghost"));
    }

    #[tokio::test]
    async fn test_single_node_mode_stops_after_first_node() {
        let fixture = fixture(
            vec![workflow("w-1", vec![node("n-1", 0, "a-1"), node("n-2", 1, "a-1")])],
            vec![agent("a-1")],
            MockChatProvider::new(),
        );

        let outcome = fixture
            .service
            .run("w-1", None, Some(json!("go")), ExecutionMode::SingleNode)
            .await
            .unwrap();

        assert_eq!(outcome.node_results.len(), 1);
        assert_eq!(outcome.execution.status(), ExecutionStatus::Running);
        assert!(outcome.execution.ended_at().is_none());
        assert_eq!(fixture.provider.request_count(), 1);

        let stored = fixture
            .executions
            .get(outcome.execution.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), ExecutionStatus::Running);
    }

    #[tokio::test]
    async fn test_single_leader_topology_checked_before_run() {
        let fixture = fixture(
            vec![single_leader_workflow(
                "w-1",
                "leader",
                vec![leader_node("n-1", 0, "leader"), node("n-2", 1, "worker")],
            )],
            vec![agent("leader"), agent("worker")],
            MockChatProvider::new(),
        );

        let result = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
        assert_eq!(fixture.provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_single_leader_workflow_runs_to_completion() {
        let fixture = fixture(
            vec![single_leader_workflow(
                "w-1",
                "leader",
                vec![
                    leader_node("n-1", 0, "leader"),
                    node("n-2", 1, "worker"),
                    leader_node("n-3", 2, "leader"),
                ],
            )],
            vec![agent("leader"), agent("worker")],
            MockChatProvider::new(),
        );

        let outcome = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        assert_eq!(outcome.execution.status(), ExecutionStatus::Completed);
        let ids: Vec<&str> = outcome
            .node_results
            .iter()
            .map(|r| r.node_id.as_str())
            .collect();
        assert_eq!(ids, vec!["n-1", "n-2", "n-3"]);
        assert!(outcome
            .node_results
            .iter()
            .all(|r| r.status == NodeResultStatus::Completed));
    }

    #[tokio::test]
    async fn test_run_records_conversation_messages() {
        let fixture = fixture(
            vec![workflow("w-1", vec![node("n-1", 0, "a-1")])],
            vec![agent("a-1")],
            MockChatProvider::new().with_reply("done"),
        );

        let outcome = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        let conversations = fixture.conversations.list().await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(
            conversations[0].workflow_execution_id.as_ref(),
            Some(outcome.execution.id())
        );

        let messages = fixture
            .conversations
            .messages(conversations[0].id.as_str())
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "done");
    }

    #[tokio::test]
    async fn test_update_status_stamps_terminal_state() {
        let fixture = fixture(
            vec![workflow("w-1", vec![node("n-1", 0, "a-1")])],
            vec![agent("a-1")],
            MockChatProvider::new(),
        );

        let outcome = fixture
            .service
            .run("w-1", None, None, ExecutionMode::RunToCompletion)
            .await
            .unwrap();

        let updated = fixture
            .service
            .update_status(
                outcome.execution.id().as_str(),
                ExecutionStatus::Failed,
                Some("flagged by reviewer".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(updated.status(), ExecutionStatus::Failed);
        assert_eq!(updated.error(), Some("flagged by reviewer"));
    }
}
