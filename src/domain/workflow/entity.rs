use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::brand::BrandId;
use crate::domain::error::DomainError;
use crate::domain::id::define_id;
use crate::domain::storage::StorageEntity;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;

use super::node::Node;

define_id!(
    /// Validated workflow identifier
    WorkflowId,
    "Workflow"
);

/// Leadership topology of the team running a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamLeaderType {
    Single,
    Multi,
}

/// An ordered pipeline of nodes executed sequentially by agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    is_public: bool,
    team_leader_type: TeamLeaderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    leader_agent_id: Option<AgentId>,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand_id: Option<BrandId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(id: WorkflowId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            description: None,
            is_public: false,
            team_leader_type: TeamLeaderType::Single,
            leader_agent_id: None,
            nodes: Vec::new(),
            user_id: None,
            team_id: None,
            brand_id: None,
            created_at: now,
            updated_at: now,
        }
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

    pub fn with_leader_agent(mut self, agent_id: AgentId) -> Self {
        self.leader_agent_id = Some(agent_id);
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn with_brand(mut self, brand_id: BrandId) -> Self {
        self.brand_id = Some(brand_id);
        self
    }

    pub fn id(&self) -> &WorkflowId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn team_leader_type(&self) -> TeamLeaderType {
        self.team_leader_type
    }

    pub fn leader_agent_id(&self) -> Option<&AgentId> {
        self.leader_agent_id.as_ref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    pub fn brand_id(&self) -> Option<&BrandId> {
        self.brand_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn set_public(&mut self, is_public: bool) {
        self.is_public = is_public;
        self.touch();
    }

    pub fn set_leader_type(&mut self, team_leader_type: TeamLeaderType) {
        self.team_leader_type = team_leader_type;
        self.touch();
    }

    pub fn set_leader_agent_id(&mut self, agent_id: Option<AgentId>) {
        self.leader_agent_id = agent_id;
        self.touch();
    }

    /// Nodes sorted by ascending order, ties kept in insertion order
    pub fn nodes_in_order(&self) -> Vec<&Node> {
        let mut sorted: Vec<&Node> = self.nodes.iter().collect();
        sorted.sort_by_key(|n| n.order());
        sorted
    }

    /// Next free order value for an appended node
    pub fn next_order(&self) -> i32 {
        self.nodes.len() as i32
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
        self.touch();
    }

    pub fn node(&self, node_id: &super::NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == node_id)
    }

    pub fn node_mut(&mut self, node_id: &super::NodeId) -> Option<&mut Node> {
        self.touch();
        self.nodes.iter_mut().find(|n| n.id() == node_id)
    }

    pub fn remove_node(&mut self, node_id: &super::NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id() == node_id)?;
        let node = self.nodes.remove(idx);
        self.touch();
        Some(node)
    }

    /// For a single-leader workflow with two or more nodes, the first and
    /// last node in execution order must be bound to the declared leader.
    pub fn validate_leader_topology(&self) -> Result<(), DomainError> {
        if self.team_leader_type != TeamLeaderType::Single || self.nodes.len() < 2 {
            return Ok(());
        }

        let leader = self.leader_agent_id.as_ref().ok_or_else(|| {
            DomainError::validation("Single-leader workflow must declare a leader agent")
        })?;

        let ordered = self.nodes_in_order();
        for node in [ordered[0], ordered[ordered.len() - 1]] {
            if node.leader_agent_id() != Some(leader) {
                return Err(DomainError::validation(format!(
                    "Node '{}' must be led by the declared leader agent '{}'",
                    node.name(),
                    leader
                )));
            }
        }

        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Workflow {
    type Key = WorkflowId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn table_name() -> &'static str {
        "workflows"
    }
}
