//! Workflow service - workflow and node CRUD

use std::sync::Arc;

use crate::domain::agent::{Agent, AgentId};
use crate::domain::brand::BrandId;
use crate::domain::storage::Storage;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::workflow::{Node, NodeId, NodePosition, TeamLeaderType, Workflow, WorkflowId};
use crate::domain::DomainError;

/// Request to create a new workflow
#[derive(Debug, Clone)]
pub struct CreateWorkflowRequest {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub team_leader_type: TeamLeaderType,
    pub leader_agent_id: Option<String>,
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    pub brand_id: Option<String>,
}

impl CreateWorkflowRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            is_public: false,
            team_leader_type: TeamLeaderType::Single,
            leader_agent_id: None,
            user_id: None,
            team_id: None,
            brand_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_leader_type(mut self, team_leader_type: TeamLeaderType) -> Self {
        self.team_leader_type = team_leader_type;
        self
    }

    pub fn with_leader_agent(mut self, leader_agent_id: impl Into<String>) -> Self {
        self.leader_agent_id = Some(leader_agent_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn with_brand(mut self, brand_id: impl Into<String>) -> Self {
        self.brand_id = Some(brand_id.into());
        self
    }
}

/// Request to update an existing workflow
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkflowRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub team_leader_type: Option<TeamLeaderType>,
    pub leader_agent_id: Option<Option<String>>,
}

impl UpdateWorkflowRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    pub fn with_leader_type(mut self, team_leader_type: TeamLeaderType) -> Self {
        self.team_leader_type = Some(team_leader_type);
        self
    }

    pub fn with_leader_agent(mut self, leader_agent_id: Option<String>) -> Self {
        self.leader_agent_id = Some(leader_agent_id);
        self
    }
}

/// Request to add a node to a workflow
#[derive(Debug, Clone)]
pub struct CreateNodeRequest {
    pub id: Option<String>,
    pub name: String,
    pub node_type: Option<String>,
    /// Explicit order; defaults to appending after the current last node
    pub order: Option<i32>,
    pub leader_agent_id: Option<String>,
    pub worker_agent_id: Option<String>,
    pub position: Option<NodePosition>,
    pub data: Option<serde_json::Value>,
}

impl CreateNodeRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            node_type: None,
            order: None,
            leader_agent_id: None,
            worker_agent_id: None,
            position: None,
            data: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_leader_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.leader_agent_id = Some(agent_id.into());
        self
    }

    pub fn with_worker_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.worker_agent_id = Some(agent_id.into());
        self
    }

    pub fn with_position(mut self, position: NodePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Request to update a node inside a workflow
#[derive(Debug, Clone, Default)]
pub struct UpdateNodeRequest {
    pub name: Option<String>,
    pub node_type: Option<String>,
    pub order: Option<i32>,
    pub leader_agent_id: Option<Option<String>>,
    pub worker_agent_id: Option<Option<String>>,
    pub position: Option<NodePosition>,
    pub data: Option<Option<serde_json::Value>>,
}

impl UpdateNodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_leader_agent(mut self, agent_id: Option<String>) -> Self {
        self.leader_agent_id = Some(agent_id);
        self
    }

    pub fn with_worker_agent(mut self, agent_id: Option<String>) -> Self {
        self.worker_agent_id = Some(agent_id);
        self
    }
}

/// Workflow service for workflow and node CRUD
pub struct WorkflowService {
    storage: Arc<dyn Storage<Workflow>>,
    agent_storage: Arc<dyn Storage<Agent>>,
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService").finish()
    }
}

impl WorkflowService {
    pub fn new(storage: Arc<dyn Storage<Workflow>>, agent_storage: Arc<dyn Storage<Agent>>) -> Self {
        Self {
            storage,
            agent_storage,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Workflow>, DomainError> {
        self.storage.get(&WorkflowId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<Workflow>, DomainError> {
        self.storage.list().await
    }

    pub async fn create(&self, request: CreateWorkflowRequest) -> Result<Workflow, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Workflow name cannot be empty"));
        }

        let workflow_id = match request.id {
            Some(id) => WorkflowId::new(id)?,
            None => WorkflowId::generate(),
        };

        let mut workflow = Workflow::new(workflow_id, request.name)
            .with_public(request.is_public)
            .with_leader_type(request.team_leader_type);

        if let Some(description) = request.description {
            workflow = workflow.with_description(description);
        }

        if let Some(leader_agent_id) = request.leader_agent_id {
            let leader_agent_id = AgentId::new(leader_agent_id)?;
            self.verify_agent(&leader_agent_id).await?;
            workflow = workflow.with_leader_agent(leader_agent_id);
        }

        if let Some(user_id) = request.user_id {
            workflow = workflow.with_user(UserId::new(user_id)?);
        }

        if let Some(team_id) = request.team_id {
            workflow = workflow.with_team(TeamId::new(team_id)?);
        }

        if let Some(brand_id) = request.brand_id {
            workflow = workflow.with_brand(BrandId::new(brand_id)?);
        }

        self.storage.create(workflow).await
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateWorkflowRequest,
    ) -> Result<Workflow, DomainError> {
        let mut workflow = self.require(id).await?;

        if let Some(name) = request.name {
            workflow.set_name(name);
        }

        if let Some(description) = request.description {
            workflow.set_description(description);
        }

        if let Some(is_public) = request.is_public {
            workflow.set_public(is_public);
        }

        if let Some(team_leader_type) = request.team_leader_type {
            workflow.set_leader_type(team_leader_type);
        }

        if let Some(leader_agent_id) = request.leader_agent_id {
            let leader_agent_id = leader_agent_id.map(AgentId::new).transpose()?;
            if let Some(ref leader_agent_id) = leader_agent_id {
                self.verify_agent(leader_agent_id).await?;
            }
            workflow.set_leader_agent_id(leader_agent_id);
        }

        self.storage.update(workflow).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        self.storage.delete(&WorkflowId::new(id)?).await
    }

    /// Add a node. Without an explicit order the node is appended with
    /// the next free order value.
    pub async fn add_node(
        &self,
        workflow_id: &str,
        request: CreateNodeRequest,
    ) -> Result<Workflow, DomainError> {
        let mut workflow = self.require(workflow_id).await?;

        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Node name cannot be empty"));
        }

        let node_id = match request.id {
            Some(id) => NodeId::new(id)?,
            None => NodeId::generate(),
        };

        let order = request.order.unwrap_or_else(|| workflow.next_order());
        let mut node = Node::new(node_id, request.name, order);

        if let Some(node_type) = request.node_type {
            node = node.with_type(node_type);
        }

        if let Some(leader_agent_id) = request.leader_agent_id {
            let leader_agent_id = AgentId::new(leader_agent_id)?;
            self.verify_agent(&leader_agent_id).await?;
            node = node.with_leader_agent(leader_agent_id);
        }

        if let Some(worker_agent_id) = request.worker_agent_id {
            let worker_agent_id = AgentId::new(worker_agent_id)?;
            self.verify_agent(&worker_agent_id).await?;
            node = node.with_worker_agent(worker_agent_id);
        }

        if let Some(position) = request.position {
            node = node.with_position(position);
        }

        if let Some(data) = request.data {
            node = node.with_data(data);
        }

        workflow.add_node(node);
        self.storage.update(workflow).await
    }

    pub async fn update_node(
        &self,
        workflow_id: &str,
        node_id: &str,
        request: UpdateNodeRequest,
    ) -> Result<Workflow, DomainError> {
        let mut workflow = self.require(workflow_id).await?;
        let node_id = NodeId::new(node_id)?;

        let leader_agent_id = match request.leader_agent_id {
            Some(id) => Some(id.map(AgentId::new).transpose()?),
            None => None,
        };
        if let Some(Some(ref id)) = leader_agent_id {
            self.verify_agent(id).await?;
        }

        let worker_agent_id = match request.worker_agent_id {
            Some(id) => Some(id.map(AgentId::new).transpose()?),
            None => None,
        };
        if let Some(Some(ref id)) = worker_agent_id {
            self.verify_agent(id).await?;
        }

        {
            let node = workflow.node_mut(&node_id).ok_or_else(|| {
                DomainError::not_found(format!("Node '{}' not found", node_id))
            })?;

            if let Some(name) = request.name {
                node.set_name(name);
            }

            if let Some(node_type) = request.node_type {
                node.set_type(node_type);
            }

            if let Some(order) = request.order {
                node.set_order(order);
            }

            if let Some(leader_agent_id) = leader_agent_id {
                node.set_leader_agent_id(leader_agent_id);
            }

            if let Some(worker_agent_id) = worker_agent_id {
                node.set_worker_agent_id(worker_agent_id);
            }

            if let Some(position) = request.position {
                node.set_position(position);
            }

            if let Some(data) = request.data {
                node.set_data(data);
            }
        }

        self.storage.update(workflow).await
    }

    pub async fn remove_node(
        &self,
        workflow_id: &str,
        node_id: &str,
    ) -> Result<Workflow, DomainError> {
        let mut workflow = self.require(workflow_id).await?;
        let node_id = NodeId::new(node_id)?;

        if workflow.remove_node(&node_id).is_none() {
            return Err(DomainError::not_found(format!(
                "Node '{}' not found",
                node_id
            )));
        }

        self.storage.update(workflow).await
    }

    async fn require(&self, id: &str) -> Result<Workflow, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Workflow '{}' not found", id)))
    }

    async fn verify_agent(&self, agent_id: &AgentId) -> Result<(), DomainError> {
        if !self.agent_storage.exists(agent_id).await? {
            return Err(DomainError::not_found(format!(
                "Agent '{}' not found",
                agent_id
            )));
        }
        Ok(())
    }
}
