//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::{
    AgentService, AnnotationService, BrandService, ConversationService, DocumentService,
    ExecutionService, RagService, TeamService, UserService, WorkflowService,
};

/// Shared handles handed to every route handler
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub team_service: Arc<TeamService>,
    pub brand_service: Arc<BrandService>,
    pub agent_service: Arc<AgentService>,
    pub workflow_service: Arc<WorkflowService>,
    pub execution_service: Arc<ExecutionService>,
    pub conversation_service: Arc<ConversationService>,
    pub annotation_service: Arc<AnnotationService>,
    pub document_service: Arc<DocumentService>,
    pub rag_service: Arc<RagService>,
}

impl AppState {
    /// Create new application state with provided services
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_service: Arc<UserService>,
        team_service: Arc<TeamService>,
        brand_service: Arc<BrandService>,
        agent_service: Arc<AgentService>,
        workflow_service: Arc<WorkflowService>,
        execution_service: Arc<ExecutionService>,
        conversation_service: Arc<ConversationService>,
        annotation_service: Arc<AnnotationService>,
        document_service: Arc<DocumentService>,
        rag_service: Arc<RagService>,
    ) -> Self {
        Self {
            user_service,
            team_service,
            brand_service,
            agent_service,
            workflow_service,
            execution_service,
            conversation_service,
            annotation_service,
            document_service,
            rag_service,
        }
    }
}
