//! Application services orchestrating storage and external providers

mod agent_service;
mod annotation_service;
mod brand_service;
mod conversation_service;
mod document_service;
mod execution_service;
mod rag_service;
mod team_service;
mod user_service;
mod workflow_service;

pub use agent_service::{AgentService, ChatWithAgentResult, CreateAgentRequest, UpdateAgentRequest};
pub use annotation_service::{
    AnnotationService, CreateConfirmRequest, CreateFeedbackRequest,
};
pub use brand_service::{
    BrandService, CreateBrandRequest, DocGuideInput, RelationInput, UpdateBrandRequest,
};
pub use conversation_service::{ConversationService, SaveMessageRequest};
pub use document_service::{
    CreateDocumentRequest, CreateRelationRequest, DocumentService, OwnerRef,
    UpdateDocumentRequest,
};
pub use execution_service::ExecutionService;
pub use rag_service::{RagAnswer, RagRequest, RagService, RagSubject};
pub use team_service::{CreateTeamRequest, TeamService, UpdateTeamRequest};
pub use user_service::{CreateUserRequest, UpdateUserRequest, UserService};
pub use workflow_service::{
    CreateNodeRequest, CreateWorkflowRequest, UpdateNodeRequest, UpdateWorkflowRequest,
    WorkflowService,
};
