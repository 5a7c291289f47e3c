use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::routes::{
    agents, annotations, brands, conversations, documents, executions, rag, teams, users,
    workflows,
};
use super::state::AppState;

/// Create a minimal router without state (for testing/backward compatibility)
/// Note: /ready endpoint is not available without state
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/{team_id}",
            get(teams::get_team)
                .patch(teams::update_team)
                .delete(teams::delete_team),
        )
        .route(
            "/teams/{team_id}/rag-docs",
            get(teams::get_rag_docs)
                .patch(teams::update_rag_docs)
                .post(teams::add_rag_doc),
        )
        // Brands
        .route("/brands", get(brands::list_brands).post(brands::create_brand))
        .route(
            "/brands/{brand_id}",
            get(brands::get_brand)
                .patch(brands::update_brand)
                .delete(brands::delete_brand),
        )
        .route(
            "/brands/{brand_id}/rag-docs",
            get(brands::get_rag_docs)
                .patch(brands::update_rag_docs)
                .post(brands::add_rag_doc),
        )
        // Agents
        .route("/agents", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/agents/{agent_id}",
            get(agents::get_agent)
                .patch(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route("/agents/{agent_id}/chat", post(agents::chat_with_agent))
        .route("/agents/{agent_id}/children", get(agents::list_children))
        .route("/agents/{agent_id}/parent", get(agents::get_parent))
        .route(
            "/agents/{agent_id}/mission",
            get(agents::get_mission).patch(agents::update_mission),
        )
        .route("/agents/{agent_id}/rag-docs", post(agents::add_rag_doc))
        // Workflows and their nodes
        .route(
            "/workflows",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route(
            "/workflows/{workflow_id}",
            get(workflows::get_workflow)
                .patch(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route("/workflows/{workflow_id}/nodes", post(workflows::add_node))
        .route(
            "/workflows/{workflow_id}/nodes/{node_id}",
            patch(workflows::update_node).delete(workflows::remove_node),
        )
        .route(
            "/workflows/{workflow_id}/nodes/{node_id}/order",
            patch(workflows::reorder_node),
        )
        .route(
            "/workflows/{workflow_id}/execute",
            post(workflows::execute_workflow),
        )
        .route(
            "/workflows/{workflow_id}/execute-all",
            post(workflows::execute_all_nodes),
        )
        // Execution records
        .route("/workflow-executions", get(executions::list_executions))
        .route(
            "/workflow-executions/{execution_id}",
            get(executions::get_execution),
        )
        .route(
            "/workflow-executions/{execution_id}/status",
            patch(executions::update_status),
        )
        .route(
            "/workflow-executions/{execution_id}/node-results",
            get(executions::list_node_results),
        )
        .route(
            "/workflow-executions/{execution_id}/messages",
            get(executions::list_messages).post(executions::post_message),
        )
        // Conversations
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversations/{conversation_id}",
            get(conversations::get_conversation),
        )
        .route(
            "/conversations/{conversation_id}/messages",
            get(conversations::list_messages),
        )
        // Annotations
        .route(
            "/feedbacks",
            get(annotations::list_feedbacks).post(annotations::create_feedback),
        )
        .route(
            "/confirms",
            get(annotations::list_confirms).post(annotations::create_confirm),
        )
        .route(
            "/confirms/{confirm_id}",
            patch(annotations::update_confirm),
        )
        // Documents, chunks and relations
        .route(
            "/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route("/documents/upload", post(documents::upload_document))
        .route(
            "/documents/{document_id}",
            get(documents::get_document)
                .patch(documents::update_document)
                .delete(documents::delete_document),
        )
        .route(
            "/documents/{document_id}/chunks",
            get(documents::list_chunks),
        )
        .route(
            "/documents/{document_id}/regen-chunks",
            post(documents::regenerate_chunks),
        )
        .route(
            "/documents/{document_id}/with-relations",
            get(documents::get_with_relations),
        )
        .route(
            "/document-relations",
            get(documents::list_relations).post(documents::create_relation),
        )
        .route(
            "/document-relations/{relation_id}",
            delete(documents::delete_relation),
        )
        // Retrieval-augmented answering
        .route("/vector-search", post(rag::vector_search))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
