//! Retrieval-augmented answering over a brand's or team's documents

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::brand::{Brand, BrandId};
use crate::domain::document::{
    Document, DocumentId, DocumentOwner, DocumentRelation, RelationScope,
};
use crate::domain::llm::{ChatMessage, ChatProvider, ChatRequest};
use crate::domain::storage::Storage;
use crate::domain::team::{Team, TeamId};
use crate::domain::vector_search::{ChunkCandidate, VectorSearchProvider};
use crate::domain::DomainError;

const RAG_MODEL: &str = "gpt-4o";
const RAG_TEMPERATURE: f32 = 0.2;
const DEFAULT_TOP_K: usize = 5;
const DOCUMENT_SUMMARY_CHARS: usize = 200;
const CHUNK_SUMMARY_CHARS: usize = 100;

/// Subject whose documents ground the answer
#[derive(Debug, Clone)]
pub enum RagSubject {
    Brand(String),
    Team(String),
}

/// One retrieval-augmented question
#[derive(Debug, Clone)]
pub struct RagRequest {
    pub query: String,
    pub subject: RagSubject,
    pub top_k: usize,
    pub chat_history: Vec<String>,
    /// Optional narrowing of the subject's stored allow-list for this
    /// one request. `None` keeps the subject's list as-is.
    pub rag_docs: Option<Vec<String>>,
}

impl RagRequest {
    pub fn new(query: impl Into<String>, subject: RagSubject) -> Self {
        Self {
            query: query.into(),
            subject,
            top_k: DEFAULT_TOP_K,
            chat_history: Vec::new(),
            rag_docs: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_chat_history(mut self, chat_history: Vec<String>) -> Self {
        self.chat_history = chat_history;
        self
    }

    pub fn with_rag_docs(mut self, rag_docs: Vec<String>) -> Self {
        self.rag_docs = Some(rag_docs);
        self
    }
}

/// The answer plus the retrieval context that produced it
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    pub model: String,
    pub candidates: Vec<ChunkCandidate>,
    pub prompt: String,
}

struct SubjectContext {
    name: String,
    mission: Option<String>,
    guide_line: Option<String>,
    owner: DocumentOwner,
    rag_docs: Vec<DocumentId>,
    scope_matches: Box<dyn Fn(&RelationScope) -> bool + Send + Sync>,
}

/// Retrieval-augmented answering service
pub struct RagService {
    brand_storage: Arc<dyn Storage<Brand>>,
    team_storage: Arc<dyn Storage<Team>>,
    document_storage: Arc<dyn Storage<Document>>,
    relation_storage: Arc<dyn Storage<DocumentRelation>>,
    vector_search: Arc<dyn VectorSearchProvider>,
    chat_provider: Arc<dyn ChatProvider>,
}

impl std::fmt::Debug for RagService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagService").finish()
    }
}

impl RagService {
    pub fn new(
        brand_storage: Arc<dyn Storage<Brand>>,
        team_storage: Arc<dyn Storage<Team>>,
        document_storage: Arc<dyn Storage<Document>>,
        relation_storage: Arc<dyn Storage<DocumentRelation>>,
        vector_search: Arc<dyn VectorSearchProvider>,
        chat_provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            brand_storage,
            team_storage,
            document_storage,
            relation_storage,
            vector_search,
            chat_provider,
        }
    }

    /// Answer a question grounded in the subject's documents. Retrieves
    /// `top_k * 2` candidates, drops anything outside the subject's
    /// stored allow-list, applies the per-request narrowing, truncates
    /// to `top_k` and sends one blocking completion call.
    pub async fn answer(&self, request: RagRequest) -> Result<RagAnswer, DomainError> {
        if request.query.trim().is_empty() {
            return Err(DomainError::validation("Query cannot be empty"));
        }
        if request.top_k == 0 {
            return Err(DomainError::validation("top_k must be at least 1"));
        }

        let subject = self.load_subject(&request.subject).await?;

        let documents = self.documents_for(&subject.owner).await?;
        let relations = self.relations_for(&subject).await?;

        let candidates = self
            .vector_search
            .search(&request.query, request.top_k * 2)
            .await?;

        let candidates = restrict_to_subject_docs(candidates, &subject.rag_docs);
        let candidates = apply_allow_list(candidates, request.rag_docs.as_deref())?;
        let candidates: Vec<ChunkCandidate> =
            candidates.into_iter().take(request.top_k).collect();

        debug!(
            subject = subject.name,
            candidate_count = candidates.len(),
            "Composing retrieval prompt"
        );

        let prompt = compose_rag_prompt(&request, &subject, &documents, &relations, &candidates);

        let chat_request = ChatRequest {
            model: RAG_MODEL.to_string(),
            messages: vec![
                ChatMessage::system(
                    "You answer questions using only the provided context. \
                     If the context does not cover the question, say so.",
                ),
                ChatMessage::user(prompt.clone()),
            ],
            temperature: RAG_TEMPERATURE,
        };
        let response = self.chat_provider.chat(chat_request).await?;

        Ok(RagAnswer {
            answer: response.content,
            model: response.model,
            candidates,
            prompt,
        })
    }

    async fn load_subject(&self, subject: &RagSubject) -> Result<SubjectContext, DomainError> {
        match subject {
            RagSubject::Brand(id) => {
                let brand_id = BrandId::new(id.clone())?;
                let brand = self
                    .brand_storage
                    .get(&brand_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found(format!("Brand '{}' not found", id)))?;

                Ok(SubjectContext {
                    name: brand.name().to_string(),
                    mission: brand.mission().map(str::to_string),
                    guide_line: brand.guide_line().map(str::to_string),
                    owner: DocumentOwner::Brand(brand_id.clone()),
                    rag_docs: brand.rag_docs().to_vec(),
                    scope_matches: Box::new(move |scope| {
                        matches!(scope, RelationScope::Brand(b) if b == &brand_id)
                    }),
                })
            }
            RagSubject::Team(id) => {
                let team_id = TeamId::new(id.clone())?;
                let team = self
                    .team_storage
                    .get(&team_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))?;

                Ok(SubjectContext {
                    name: team.name().to_string(),
                    mission: team.description().map(str::to_string),
                    guide_line: None,
                    owner: DocumentOwner::Team(team_id.clone()),
                    rag_docs: team.rag_docs().to_vec(),
                    scope_matches: Box::new(move |scope| {
                        matches!(scope, RelationScope::Team(t) if t == &team_id)
                    }),
                })
            }
        }
    }

    async fn documents_for(&self, owner: &DocumentOwner) -> Result<Vec<Document>, DomainError> {
        Ok(self
            .document_storage
            .list()
            .await?
            .into_iter()
            .filter(|d| d.owner() == owner)
            .collect())
    }

    async fn relations_for(
        &self,
        subject: &SubjectContext,
    ) -> Result<Vec<DocumentRelation>, DomainError> {
        let mut relations: Vec<DocumentRelation> = self
            .relation_storage
            .list()
            .await?
            .into_iter()
            .filter(|r| (subject.scope_matches)(&r.scope))
            .collect();
        relations.sort_by_key(|r| r.seq);
        Ok(relations)
    }
}

/// The subject's stored allow-list. An empty list admits everything.
fn restrict_to_subject_docs(
    candidates: Vec<ChunkCandidate>,
    rag_docs: &[DocumentId],
) -> Vec<ChunkCandidate> {
    if rag_docs.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| rag_docs.contains(&c.document_id))
        .collect()
}

fn apply_allow_list(
    candidates: Vec<ChunkCandidate>,
    rag_docs: Option<&[String]>,
) -> Result<Vec<ChunkCandidate>, DomainError> {
    let Some(rag_docs) = rag_docs else {
        return Ok(candidates);
    };

    let allowed: HashSet<DocumentId> = rag_docs
        .iter()
        .map(|id| DocumentId::new(id.clone()))
        .collect::<Result<_, _>>()?;

    Ok(candidates
        .into_iter()
        .filter(|c| allowed.contains(&c.document_id))
        .collect())
}

/// Truncate to a character budget, appending an ellipsis when cut
fn summarize(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{}...", cut)
}

fn compose_rag_prompt(
    request: &RagRequest,
    subject: &SubjectContext,
    documents: &[Document],
    relations: &[DocumentRelation],
    candidates: &[ChunkCandidate],
) -> String {
    let mut prompt = String::new();

    if !request.chat_history.is_empty() {
        prompt.push_str("[Chat history]\n");
        for line in &request.chat_history {
            prompt.push_str(line);
            prompt.push('\n');
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("[Subject]\n{}\n\n", subject.name));

    if let Some(mission) = &subject.mission {
        prompt.push_str(&format!("[Mission]\n{}\n\n", mission));
    }
    if let Some(guide_line) = &subject.guide_line {
        prompt.push_str(&format!("[Guideline]\n{}\n\n", guide_line));
    }

    if !documents.is_empty() {
        prompt.push_str("[Document summaries]\n");
        for document in documents {
            prompt.push_str(&format!(
                "- {}: {}\n",
                document.title(),
                summarize(document.content(), DOCUMENT_SUMMARY_CHARS)
            ));
        }
        prompt.push('\n');
    }

    if !relations.is_empty() {
        prompt.push_str("[Document relations]\n");
        for relation in relations {
            let mut line = format!(
                "- {} -> {} ({})",
                relation.from_id, relation.to_id, relation.relation_type
            );
            if let Some(rel_prompt) = &relation.prompt {
                line.push_str(&format!(": {}", rel_prompt));
            }
            line.push('\n');
            prompt.push_str(&line);
        }
        prompt.push('\n');
    }

    if !candidates.is_empty() {
        prompt.push_str("[Relevant chunk summaries]\n");
        for candidate in candidates {
            prompt.push_str(&format!(
                "- {}\n",
                summarize(&candidate.content, CHUNK_SUMMARY_CHARS)
            ));
        }
        prompt.push('\n');

        prompt.push_str("[Relevant chunks]\n");
        for candidate in candidates {
            prompt.push_str(&candidate.content);
            prompt.push_str("\n\n");
        }
    }

    prompt.push_str(&format!("[Question]\n{}", request.query));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::mock::MockChatProvider;
    use crate::domain::storage::mock::MockStorage;
    use crate::domain::vector_search::mock::MockVectorSearchProvider;

    struct Fixture {
        service: RagService,
        provider: Arc<MockChatProvider>,
        search: Arc<MockVectorSearchProvider>,
    }

    fn fixture(
        brands: Vec<Brand>,
        documents: Vec<Document>,
        search: MockVectorSearchProvider,
    ) -> Fixture {
        let mut brand_storage = MockStorage::new();
        for b in brands {
            brand_storage = brand_storage.with_entity(b);
        }
        let mut document_storage = MockStorage::new();
        for d in documents {
            document_storage = document_storage.with_entity(d);
        }

        let provider = Arc::new(MockChatProvider::new());
        let search = Arc::new(search);

        Fixture {
            service: RagService::new(
                Arc::new(brand_storage),
                Arc::new(MockStorage::new()),
                Arc::new(document_storage),
                Arc::new(MockStorage::new()),
                search.clone(),
                provider.clone(),
            ),
            provider,
            search,
        }
    }

    fn brand(id: &str) -> Brand {
        Brand::new(BrandId::new(id).unwrap(), "Acme")
            .with_mission("Sell rockets")
            .with_guide_line("Stay upbeat")
    }

    #[tokio::test]
    async fn test_missing_subject_is_not_found() {
        let fixture = fixture(vec![], vec![], MockVectorSearchProvider::new());

        let result = fixture
            .service
            .answer(RagRequest::new("q", RagSubject::Brand("b-missing".to_string())))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_allow_list_filters_candidates() {
        let search = MockVectorSearchProvider::new()
            .with_candidate("d-1", "alpha chunk", 0.9)
            .with_candidate("d-3", "gamma chunk", 0.8)
            .with_candidate("d-2", "beta chunk", 0.7);
        let fixture = fixture(vec![brand("b-1")], vec![], search);

        let answer = fixture
            .service
            .answer(
                RagRequest::new("what?", RagSubject::Brand("b-1".to_string()))
                    .with_top_k(2)
                    .with_rag_docs(vec!["d-1".to_string(), "d-2".to_string()]),
            )
            .await
            .unwrap();

        let ids: Vec<&str> = answer
            .candidates
            .iter()
            .map(|c| c.document_id.as_str())
            .collect();
        assert_eq!(ids, vec!["d-1", "d-2"]);
        assert!(!answer.prompt.contains("gamma chunk"));
    }

    #[tokio::test]
    async fn test_subject_allow_list_filters_candidates() {
        let search = MockVectorSearchProvider::new()
            .with_candidate("d-1", "alpha chunk", 0.9)
            .with_candidate("d-3", "stray chunk", 0.8);
        let brand = brand("b-1").with_rag_docs(vec![DocumentId::new("d-1").unwrap()]);
        let fixture = fixture(vec![brand], vec![], search);

        let answer = fixture
            .service
            .answer(RagRequest::new("what?", RagSubject::Brand("b-1".to_string())))
            .await
            .unwrap();

        let ids: Vec<&str> = answer
            .candidates
            .iter()
            .map(|c| c.document_id.as_str())
            .collect();
        assert_eq!(ids, vec!["d-1"]);
        assert!(!answer.prompt.contains("stray chunk"));
    }

    #[tokio::test]
    async fn test_request_narrows_subject_allow_list() {
        let search = MockVectorSearchProvider::new()
            .with_candidate("d-1", "one", 0.9)
            .with_candidate("d-2", "two", 0.8);
        let brand = brand("b-1").with_rag_docs(vec![
            DocumentId::new("d-1").unwrap(),
            DocumentId::new("d-2").unwrap(),
        ]);
        let fixture = fixture(vec![brand], vec![], search);

        let answer = fixture
            .service
            .answer(
                RagRequest::new("q", RagSubject::Brand("b-1".to_string()))
                    .with_rag_docs(vec!["d-2".to_string()]),
            )
            .await
            .unwrap();

        let ids: Vec<&str> = answer
            .candidates
            .iter()
            .map(|c| c.document_id.as_str())
            .collect();
        assert_eq!(ids, vec!["d-2"]);
    }

    #[test]
    fn test_answer_future_is_send() {
        fn require_send<T: Send>(_: T) {}

        let fixture = fixture(vec![], vec![], MockVectorSearchProvider::new());
        require_send(
            fixture
                .service
                .answer(RagRequest::new("q", RagSubject::Brand("b-1".to_string()))),
        );
    }

    #[tokio::test]
    async fn test_search_over_fetches_then_truncates() {
        let search = MockVectorSearchProvider::new()
            .with_candidate("d-1", "one", 0.9)
            .with_candidate("d-2", "two", 0.8)
            .with_candidate("d-3", "three", 0.7);
        let fixture = fixture(vec![brand("b-1")], vec![], search);

        let answer = fixture
            .service
            .answer(RagRequest::new("q", RagSubject::Brand("b-1".to_string())).with_top_k(2))
            .await
            .unwrap();

        assert_eq!(answer.candidates.len(), 2);
        let queries = fixture.search.queries.lock().unwrap().clone();
        assert_eq!(queries, vec![("q".to_string(), 4)]);
    }

    #[tokio::test]
    async fn test_prompt_carries_subject_context() {
        let document = Document::new(
            DocumentId::new("d-1").unwrap(),
            "Tone guide",
            "Always write warmly and never shout.",
            DocumentOwner::Brand(BrandId::new("b-1").unwrap()),
        );
        let fixture = fixture(
            vec![brand("b-1")],
            vec![document],
            MockVectorSearchProvider::new().with_candidate("d-1", "write warmly", 0.9),
        );

        let answer = fixture
            .service
            .answer(
                RagRequest::new("How should we sound?", RagSubject::Brand("b-1".to_string()))
                    .with_chat_history(vec!["user: hello".to_string()]),
            )
            .await
            .unwrap();

        assert!(answer.prompt.contains("[Chat history]"));
        assert!(answer.prompt.contains("Sell rockets"));
        assert!(answer.prompt.contains("Stay upbeat"));
        assert!(answer.prompt.contains("Tone guide"));
        assert!(answer.prompt.contains("write warmly"));
        assert!(answer.prompt.ends_with("How should we sound?"));

        let request = fixture.provider.request_at(0);
        assert_eq!(request.model, RAG_MODEL);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let fixture = fixture(vec![brand("b-1")], vec![], MockVectorSearchProvider::new());

        let result = fixture
            .service
            .answer(RagRequest::new("  ", RagSubject::Brand("b-1".to_string())))
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[test]
    fn test_summarize_truncates_on_char_boundary() {
        assert_eq!(summarize("short", 10), "short");
        assert_eq!(summarize("달".repeat(12).as_str(), 10), format!("{}...", "달".repeat(10)));
    }
}
