//! Agent service - agent CRUD, hierarchy management and direct chat

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::agent::{Agent, AgentId, AgentRole, AgentType, Identity};
use crate::domain::brand::BrandId;
use crate::domain::document::DocumentId;
use crate::domain::llm::{ChatMessage, ChatProvider, ChatRequest};
use crate::domain::storage::Storage;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Request to create a new agent
#[derive(Debug, Clone)]
pub struct CreateAgentRequest {
    pub id: Option<String>,
    pub name: String,
    pub role: Option<AgentRole>,
    pub agent_type: Option<AgentType>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub prompt: Option<String>,
    pub identity: Option<Identity>,
    pub rag_docs: Vec<String>,
    pub parent_agent_id: Option<String>,
    pub user_id: Option<String>,
    pub team_id: Option<String>,
    pub brand_id: Option<String>,
}

impl CreateAgentRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            role: None,
            agent_type: None,
            model: None,
            temperature: None,
            prompt: None,
            identity: None,
            rag_docs: Vec::new(),
            parent_agent_id: None,
            user_id: None,
            team_id: None,
            brand_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_role(mut self, role: AgentRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = Some(agent_type);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_rag_doc(mut self, document_id: impl Into<String>) -> Self {
        self.rag_docs.push(document_id.into());
        self
    }

    pub fn with_parent(mut self, parent_agent_id: impl Into<String>) -> Self {
        self.parent_agent_id = Some(parent_agent_id.into());
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

/// Request to update an existing agent (partial patch)
#[derive(Debug, Clone, Default)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub role: Option<AgentRole>,
    pub agent_type: Option<AgentType>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub prompt: Option<String>,
    pub identity: Option<Identity>,
    pub rag_docs: Option<Vec<String>>,
    pub parent_agent_id: Option<Option<String>>,
}

impl UpdateAgentRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: AgentRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = Some(agent_type);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_rag_docs(mut self, rag_docs: Vec<String>) -> Self {
        self.rag_docs = Some(rag_docs);
        self
    }

    pub fn with_parent(mut self, parent_agent_id: Option<String>) -> Self {
        self.parent_agent_id = Some(parent_agent_id);
        self
    }
}

/// Answer from a direct agent chat
#[derive(Debug, Clone)]
pub struct ChatWithAgentResult {
    pub answer: String,
    pub model: String,
}

/// Agent service for CRUD, hierarchy and direct chat
pub struct AgentService {
    storage: Arc<dyn Storage<Agent>>,
    chat_provider: Arc<dyn ChatProvider>,
}

impl std::fmt::Debug for AgentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentService").finish()
    }
}

impl AgentService {
    pub fn new(storage: Arc<dyn Storage<Agent>>, chat_provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            storage,
            chat_provider,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Agent>, DomainError> {
        self.storage.get(&AgentId::new(id)?).await
    }

    pub async fn list(&self) -> Result<Vec<Agent>, DomainError> {
        self.storage.list().await
    }

    pub async fn create(&self, request: CreateAgentRequest) -> Result<Agent, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Agent name cannot be empty"));
        }

        let agent_id = match request.id {
            Some(id) => AgentId::new(id)?,
            None => AgentId::generate(),
        };

        let mut agent = Agent::new(agent_id.clone(), request.name);

        if let Some(role) = request.role {
            agent = agent.with_role(role);
        }

        if let Some(agent_type) = request.agent_type {
            agent = agent.with_type(agent_type);
        }

        if let Some(model) = request.model {
            agent = agent.with_model(model);
        }

        if let Some(temperature) = request.temperature {
            agent = agent.with_temperature(temperature);
        }

        if let Some(prompt) = request.prompt {
            agent = agent.with_prompt(prompt);
        }

        if let Some(identity) = request.identity {
            agent = agent.with_identity(identity);
        }

        let rag_docs = request
            .rag_docs
            .into_iter()
            .map(DocumentId::new)
            .collect::<Result<Vec<_>, _>>()?;
        agent = agent.with_rag_docs(rag_docs);

        if let Some(parent_id) = request.parent_agent_id {
            let parent_id = AgentId::new(parent_id)?;
            self.ensure_no_cycle(&agent_id, &parent_id).await?;
            agent = agent.with_parent(parent_id);
        }

        if let Some(user_id) = request.user_id {
            agent = agent.with_user(UserId::new(user_id)?);
        }

        if let Some(team_id) = request.team_id {
            agent = agent.with_team(TeamId::new(team_id)?);
        }

        if let Some(brand_id) = request.brand_id {
            agent = agent.with_brand(BrandId::new(brand_id)?);
        }

        self.storage.create(agent).await
    }

    pub async fn update(&self, id: &str, request: UpdateAgentRequest) -> Result<Agent, DomainError> {
        let agent_id = AgentId::new(id)?;

        let mut agent = self
            .storage
            .get(&agent_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Agent '{}' not found", id)))?;

        if let Some(name) = request.name {
            agent.set_name(name);
        }

        if let Some(role) = request.role {
            agent.set_role(role);
        }

        if let Some(agent_type) = request.agent_type {
            agent.set_type(agent_type);
        }

        if let Some(model) = request.model {
            agent.set_model(model);
        }

        if let Some(temperature) = request.temperature {
            agent.set_temperature(temperature);
        }

        if let Some(prompt) = request.prompt {
            agent.set_prompt(prompt);
        }

        if let Some(identity) = request.identity {
            agent.set_identity(identity);
        }

        if let Some(rag_docs) = request.rag_docs {
            let rag_docs = rag_docs
                .into_iter()
                .map(DocumentId::new)
                .collect::<Result<Vec<_>, _>>()?;
            agent.set_rag_docs(rag_docs);
        }

        if let Some(parent_id) = request.parent_agent_id {
            let parent_id = parent_id.map(AgentId::new).transpose()?;
            if let Some(ref parent_id) = parent_id {
                self.ensure_no_cycle(&agent_id, parent_id).await?;
            }
            agent.set_parent_agent_id(parent_id);
        }

        self.storage.update(agent).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        self.storage.delete(&AgentId::new(id)?).await
    }

    /// Filtered listing; every filter that is `None` matches all agents
    pub async fn search(
        &self,
        team_id: Option<&str>,
        role: Option<AgentRole>,
        agent_type: Option<AgentType>,
    ) -> Result<Vec<Agent>, DomainError> {
        let team_id = team_id.map(TeamId::new).transpose()?;

        Ok(self
            .storage
            .list()
            .await?
            .into_iter()
            .filter(|a| team_id.as_ref().is_none_or(|t| a.team_id() == Some(t)))
            .filter(|a| role.is_none_or(|r| a.role() == r))
            .filter(|a| agent_type.is_none_or(|t| a.agent_type() == t))
            .collect())
    }

    /// Direct children of an agent (one level, no traversal)
    pub async fn children(&self, id: &str) -> Result<Vec<Agent>, DomainError> {
        let agent_id = AgentId::new(id)?;
        let agents = self.storage.list().await?;
        Ok(agents
            .into_iter()
            .filter(|a| a.parent_agent_id() == Some(&agent_id))
            .collect())
    }

    /// The agent's parent, if it has one
    pub async fn parent(&self, id: &str) -> Result<Option<Agent>, DomainError> {
        let agent = self
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Agent '{}' not found", id)))?;

        match agent.parent_agent_id() {
            Some(parent_id) => self.storage.get(parent_id).await,
            None => Ok(None),
        }
    }

    /// Update only the mission inside the agent's identity
    pub async fn update_mission(&self, id: &str, mission: impl Into<String>) -> Result<Agent, DomainError> {
        let agent_id = AgentId::new(id)?;

        let mut agent = self
            .storage
            .get(&agent_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Agent '{}' not found", id)))?;

        let identity = agent.identity().clone().with_updated_mission(mission.into());
        agent.set_identity(identity);

        self.storage.update(agent).await
    }

    /// Append a document to the agent's RAG allow-list
    pub async fn add_rag_doc(&self, id: &str, document_id: &str) -> Result<Agent, DomainError> {
        let agent_id = AgentId::new(id)?;
        let document_id = DocumentId::new(document_id)?;

        let mut agent = self
            .storage
            .get(&agent_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Agent '{}' not found", id)))?;

        agent.add_rag_doc(document_id);
        self.storage.update(agent).await
    }

    /// Send a question to an agent. The prompt carries the agent's
    /// configured prompt and identity, the model and temperature come
    /// from the agent record.
    pub async fn chat(&self, id: &str, question: &str) -> Result<ChatWithAgentResult, DomainError> {
        let agent = self
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Agent '{}' not found", id)))?;

        debug!(agent_id = id, model = agent.model(), "Direct agent chat");

        let request = ChatRequest {
            model: agent.model().to_string(),
            messages: vec![
                ChatMessage::system("You are the team's AI agent."),
                ChatMessage::user(compose_agent_prompt(&agent, question)),
            ],
            temperature: agent.temperature(),
        };

        let response = self.chat_provider.chat(request).await?;

        Ok(ChatWithAgentResult {
            answer: response.content,
            model: response.model,
        })
    }

    /// Reject a parent assignment that would close a cycle. Walks the
    /// prospective parent chain and fails if it reaches the agent itself.
    async fn ensure_no_cycle(&self, agent_id: &AgentId, parent_id: &AgentId) -> Result<(), DomainError> {
        if agent_id == parent_id {
            return Err(DomainError::validation(format!(
                "Agent '{}' cannot be its own parent",
                agent_id
            )));
        }

        let mut visited = HashSet::new();
        let mut current = Some(parent_id.clone());

        while let Some(id) = current {
            if &id == agent_id {
                return Err(DomainError::validation(format!(
                    "Assigning parent '{}' to agent '{}' would create a cycle",
                    parent_id, agent_id
                )));
            }

            if !visited.insert(id.clone()) {
                // An existing cycle above us; still reject the assignment
                return Err(DomainError::validation(format!(
                    "Parent chain of '{}' already contains a cycle",
                    parent_id
                )));
            }

            current = match self.storage.get(&id).await? {
                Some(agent) => agent.parent_agent_id().cloned(),
                None => None,
            };
        }

        Ok(())
    }
}

/// Prompt for a direct agent chat: role, configured prompt, identity, question
fn compose_agent_prompt(agent: &Agent, question: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("[Agent role]\n{:?}\n\n", agent.role()));

    if !agent.prompt().is_empty() {
        prompt.push_str(&format!("[Agent instructions]\n{}\n\n", agent.prompt()));
    }

    let identity = agent.identity().to_prompt_text();
    if !identity.is_empty() {
        prompt.push_str(&format!("[Agent identity]\n{}\n\n", identity));
    }

    prompt.push_str(&format!("[Question]\n{}", question));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::mock::MockChatProvider;
    use crate::domain::storage::mock::MockStorage;

    fn agent(id: &str) -> Agent {
        Agent::new(AgentId::new(id).unwrap(), format!("Agent {}", id))
    }

    fn service_with(agents: Vec<Agent>, provider: MockChatProvider) -> AgentService {
        let mut storage = MockStorage::new();
        for a in agents {
            storage = storage.with_entity(a);
        }
        AgentService::new(Arc::new(storage), Arc::new(provider))
    }

    #[tokio::test]
    async fn test_create_with_defaults() {
        let service = service_with(vec![], MockChatProvider::new());

        let agent = service.create(CreateAgentRequest::new("Writer")).await.unwrap();
        assert_eq!(agent.model(), "gpt-4o");
        assert_eq!(agent.agent_type(), AgentType::Worker);
    }

    #[tokio::test]
    async fn test_self_parent_rejected() {
        let service = service_with(vec![agent("a-1")], MockChatProvider::new());

        let result = service
            .update("a-1", UpdateAgentRequest::new().with_parent(Some("a-1".to_string())))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_parent_cycle_rejected() {
        // a-2 is already a child of a-1; making a-1 a child of a-2 closes a loop
        let mut child = agent("a-2");
        child.set_parent_agent_id(Some(AgentId::new("a-1").unwrap()));
        let service = service_with(vec![agent("a-1"), child], MockChatProvider::new());

        let result = service
            .update("a-1", UpdateAgentRequest::new().with_parent(Some("a-2".to_string())))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_children_one_level_only() {
        let mut child = agent("a-2");
        child.set_parent_agent_id(Some(AgentId::new("a-1").unwrap()));
        let mut grandchild = agent("a-3");
        grandchild.set_parent_agent_id(Some(AgentId::new("a-2").unwrap()));

        let service = service_with(vec![agent("a-1"), child, grandchild], MockChatProvider::new());

        let children = service.children("a-1").await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id().as_str(), "a-2");
    }

    #[tokio::test]
    async fn test_parent_lookup() {
        let mut child = agent("a-2");
        child.set_parent_agent_id(Some(AgentId::new("a-1").unwrap()));
        let service = service_with(vec![agent("a-1"), child], MockChatProvider::new());

        let parent = service.parent("a-2").await.unwrap();
        assert_eq!(parent.unwrap().id().as_str(), "a-1");

        let none = service.parent("a-1").await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_update_mission() {
        let service = service_with(vec![agent("a-1")], MockChatProvider::new());

        let updated = service.update_mission("a-1", "Grow the brand").await.unwrap();
        assert_eq!(updated.identity().mission(), Some("Grow the brand"));
    }

    #[tokio::test]
    async fn test_add_rag_doc() {
        let service = service_with(vec![agent("a-1")], MockChatProvider::new());

        service.add_rag_doc("a-1", "d-1").await.unwrap();
        let updated = service.add_rag_doc("a-1", "d-1").await.unwrap();

        assert_eq!(updated.rag_docs().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_uses_agent_model_and_prompt() {
        let provider = Arc::new(MockChatProvider::new().with_reply("Here is the plan"));
        let mut configured = agent("a-1");
        configured.set_model("gpt-4o-mini");
        configured.set_prompt("You write marketing copy");

        let service = AgentService::new(
            Arc::new(MockStorage::new().with_entity(configured)),
            provider.clone(),
        );

        let result = service.chat("a-1", "Draft a tagline").await.unwrap();
        assert_eq!(result.answer, "Here is the plan");

        let request = provider.request_at(0);
        assert_eq!(request.model, "gpt-4o-mini");
        assert!(request.messages[1].content.contains("You write marketing copy"));
        assert!(request.messages[1].content.contains("Draft a tagline"));
    }

    #[tokio::test]
    async fn test_chat_unknown_agent() {
        let service = service_with(vec![], MockChatProvider::new());

        let result = service.chat("a-404", "hello").await;
        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }
}
