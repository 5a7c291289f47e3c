//! Agent platform
//!
//! A multi-tenant platform for AI agents with support for:
//! - Agent, team, brand and user management
//! - Sequential workflow execution with per-node agent sessions
//! - Document chunking, embedding and retrieval-augmented answering
//! - In-memory or PostgreSQL persistence behind one storage trait

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use domain::agent::Agent;
use domain::annotation::{AgentConfirm, AgentFeedback};
use domain::brand::Brand;
use domain::conversation::{Conversation, Message};
use domain::document::{Document, DocumentRelation};
use domain::embedding::EmbeddingProvider;
use domain::execution::{AgentSession, NodeResult, WorkflowExecution};
use domain::llm::ChatProvider;
use domain::team::Team;
use domain::user::User;
use domain::vector_search::VectorSearchProvider;
use domain::workflow::Workflow;
use infrastructure::http::HttpClient;
use infrastructure::openai::{
    OpenAiChatProvider, OpenAiEmbeddingProvider, OpenAiVectorSearchProvider,
};
use infrastructure::services::{
    AgentService, AnnotationService, BrandService, ConversationService, DocumentService,
    ExecutionService, RagService, TeamService, UserService, WorkflowService,
};
use infrastructure::storage::{StorageFactory, StorageType};

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let factory = create_storage_factory(config).await?;

    let user_storage = factory.create::<User>().await?;
    let team_storage = factory.create::<Team>().await?;
    let brand_storage = factory.create::<Brand>().await?;
    let agent_storage = factory.create::<Agent>().await?;
    let workflow_storage = factory.create::<Workflow>().await?;
    let execution_storage = factory.create::<WorkflowExecution>().await?;
    let session_storage = factory.create::<AgentSession>().await?;
    let node_result_storage = factory.create::<NodeResult>().await?;
    let conversation_storage = factory.create::<Conversation>().await?;
    let message_storage = factory.create::<Message>().await?;
    let feedback_storage = factory.create::<AgentFeedback>().await?;
    let confirm_storage = factory.create::<AgentConfirm>().await?;
    let document_storage = factory.create::<Document>().await?;
    let relation_storage = factory.create::<DocumentRelation>().await?;
    let chunk_repository = factory.create_chunk_repository().await?;

    let (chat_provider, embedding_provider, vector_search) = create_openai_providers(config);

    let user_service = Arc::new(UserService::new(user_storage));
    let team_service = Arc::new(TeamService::new(team_storage.clone(), brand_storage.clone()));
    let brand_service = Arc::new(BrandService::new(
        brand_storage.clone(),
        document_storage.clone(),
        relation_storage.clone(),
    ));
    let agent_service = Arc::new(AgentService::new(
        agent_storage.clone(),
        chat_provider.clone(),
    ));
    let workflow_service = Arc::new(WorkflowService::new(
        workflow_storage.clone(),
        agent_storage.clone(),
    ));
    let conversation_service = Arc::new(ConversationService::new(
        conversation_storage,
        message_storage,
    ));
    let execution_service = Arc::new(ExecutionService::new(
        workflow_storage,
        agent_storage,
        execution_storage,
        session_storage,
        node_result_storage,
        chat_provider.clone(),
        conversation_service.clone(),
    ));
    let annotation_service = Arc::new(AnnotationService::new(feedback_storage, confirm_storage));
    let document_service = Arc::new(DocumentService::new(
        document_storage.clone(),
        chunk_repository,
        relation_storage.clone(),
        embedding_provider,
    ));
    let rag_service = Arc::new(RagService::new(
        brand_storage,
        team_storage,
        document_storage,
        relation_storage,
        vector_search,
        chat_provider,
    ));

    Ok(AppState::new(
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
    ))
}

async fn create_storage_factory(config: &AppConfig) -> anyhow::Result<StorageFactory> {
    let backend = StorageType::parse(&config.storage.backend).unwrap_or(StorageType::InMemory);
    info!("Storage backend: {:?}", backend);

    match backend {
        StorageType::InMemory => Ok(StorageFactory::in_memory()),
        StorageType::Postgres => {
            let pg_config = infrastructure::storage::PostgresConfig {
                url: config.storage.postgres_url.clone(),
                max_connections: config.storage.max_connections,
                connect_timeout_secs: config.storage.connect_timeout_secs,
            };
            let factory = StorageFactory::postgres(&pg_config).await?;
            info!("PostgreSQL connection established");
            Ok(factory)
        }
    }
}

fn create_openai_providers(
    config: &AppConfig,
) -> (
    Arc<dyn ChatProvider>,
    Arc<dyn EmbeddingProvider>,
    Arc<dyn VectorSearchProvider>,
) {
    let api_key = config.openai.api_key.as_str();

    let chat: Arc<dyn ChatProvider> = match &config.openai.base_url {
        Some(base_url) => Arc::new(OpenAiChatProvider::with_base_url(
            HttpClient::new(),
            api_key,
            base_url.as_str(),
        )),
        None => Arc::new(OpenAiChatProvider::new(HttpClient::new(), api_key)),
    };

    let embeddings_provider = match &config.openai.base_url {
        Some(base_url) => {
            OpenAiEmbeddingProvider::with_base_url(HttpClient::new(), api_key, base_url.as_str())
        }
        None => OpenAiEmbeddingProvider::new(HttpClient::new(), api_key),
    };
    let embeddings: Arc<dyn EmbeddingProvider> =
        Arc::new(embeddings_provider.with_model(config.openai.embedding_model.as_str()));

    let vector_search: Arc<dyn VectorSearchProvider> = match &config.openai.base_url {
        Some(base_url) => Arc::new(OpenAiVectorSearchProvider::with_base_url(
            HttpClient::new(),
            api_key,
            config.openai.vector_store_id.as_str(),
            base_url.as_str(),
        )),
        None => Arc::new(OpenAiVectorSearchProvider::new(
            HttpClient::new(),
            api_key,
            config.openai.vector_store_id.as_str(),
        )),
    };

    (chat, embeddings, vector_search)
}
