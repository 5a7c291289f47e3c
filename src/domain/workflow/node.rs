use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::id::define_id;

define_id!(
    /// Validated node identifier
    NodeId,
    "Node"
);

/// Canvas position for UI rendering, opaque to execution
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

/// One ordered step of a workflow, bound to a responsible agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    name: String,
    node_type: String,
    order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    leader_agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    worker_agent_id: Option<AgentId>,
    #[serde(default)]
    position: NodePosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, order: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            node_type: "task".to_string(),
            order,
            leader_agent_id: None,
            worker_agent_id: None,
            position: NodePosition::default(),
            data: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    pub fn with_leader_agent(mut self, agent_id: AgentId) -> Self {
        self.leader_agent_id = Some(agent_id);
        self
    }

    pub fn with_worker_agent(mut self, agent_id: AgentId) -> Self {
        self.worker_agent_id = Some(agent_id);
        self
    }

    pub fn with_position(mut self, position: NodePosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn leader_agent_id(&self) -> Option<&AgentId> {
        self.leader_agent_id.as_ref()
    }

    pub fn worker_agent_id(&self) -> Option<&AgentId> {
        self.worker_agent_id.as_ref()
    }

    /// The agent that executes this node: leader takes precedence over worker
    pub fn responsible_agent(&self) -> Option<&AgentId> {
        self.leader_agent_id.as_ref().or(self.worker_agent_id.as_ref())
    }

    pub fn position(&self) -> NodePosition {
        self.position
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
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

    pub fn set_type(&mut self, node_type: impl Into<String>) {
        self.node_type = node_type.into();
        self.touch();
    }

    pub fn set_order(&mut self, order: i32) {
        self.order = order;
        self.touch();
    }

    pub fn set_leader_agent_id(&mut self, agent_id: Option<AgentId>) {
        self.leader_agent_id = agent_id;
        self.touch();
    }

    pub fn set_worker_agent_id(&mut self, agent_id: Option<AgentId>) {
        self.worker_agent_id = agent_id;
        self.touch();
    }

    pub fn set_position(&mut self, position: NodePosition) {
        self.position = position;
        self.touch();
    }

    pub fn set_data(&mut self, data: Option<serde_json::Value>) {
        self.data = data;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
