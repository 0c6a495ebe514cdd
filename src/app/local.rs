use chrono::{DateTime, Utc};

use crate::{
    config::Config,
    documents::{Document, DocumentCreate, DocumentStore, DocumentSummary},
    semantic::{AnswerResult, HashEmbedder, RetrievalEngine},
};

use super::{
    errors::AppError,
    history::QueryHistory,
    reports::{
        EmbeddingProbe, HealthReport, LimitsStatus, PerformanceStatus, StatusReport, SystemStatus,
        PROBE_TEXT,
    },
};

/// In-process knowledge base: document store, retrieval engine and query log.
///
/// Owned by whoever serves requests. Nothing here is shared globally;
/// callers needing concurrent access wrap it in a lock.
pub struct AppLocal {
    config: Config,
    store: DocumentStore,
    engine: RetrievalEngine,
    history: QueryHistory,
    started_at: DateTime<Utc>,
}

impl AppLocal {
    pub fn new(config: Config) -> Self {
        let embedder = HashEmbedder::new(config.retrieval.dimensions);
        let store = DocumentStore::new(
            embedder,
            config.retrieval.max_keywords,
            config.limits.max_document_size,
        );
        let engine = RetrievalEngine::from_config(&config);

        Self {
            config,
            store,
            engine,
            history: QueryHistory::new(),
            started_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn total(&self) -> usize {
        self.store.len()
    }

    pub fn add_document(&mut self, create: DocumentCreate) -> Result<Document, AppError> {
        let document = self.store.add(create)?;
        Ok(document.clone())
    }

    /// Answer a question and record it in the query log.
    ///
    /// The question is logged after validation and truncation, before the
    /// store is consulted, so questions against an empty store count too.
    pub fn answer_question(&mut self, question: &str) -> Result<AnswerResult, AppError> {
        let question = self.engine.parse_question(question)?;
        self.history.record(question.as_str(), self.store.len());

        let result = self.engine.answer(&self.store, &question);
        log::debug!(
            "answered with status {:?} from document {:?} (confidence {})",
            result.status,
            result.source.as_ref().map(|source| source.document_id()),
            result.confidence
        );

        Ok(result)
    }

    pub fn list_documents(&self) -> Vec<DocumentSummary> {
        self.store.list()
    }

    /// Drop every document and the query log. Returns the number of documents removed.
    pub fn clear_store(&mut self) -> usize {
        let count = self.store.clear();
        self.history.clear();
        log::info!("cleared {count} documents");
        count
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            system: SystemStatus {
                documents_count: self.store.len(),
                queries_count: self.history.len(),
                embedding_dimensions: self.store.embedder().dimensions(),
                max_documents: self.config.limits.max_documents,
            },
            performance: PerformanceStatus {
                uptime_secs: (Utc::now() - self.started_at).num_seconds(),
                last_query: self.history.last().map(|record| record.timestamp),
            },
            limits: LimitsStatus {
                max_document_size: self.config.limits.max_document_size,
                max_question_length: self.config.limits.max_question_length,
                supported_formats: vec!["text".to_string(), "json".to_string()],
            },
        }
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            memory_usage: self.store.len(),
            environment: self.config.server.environment.clone(),
        }
    }

    /// Embed the built-in sample text with the configured embedder.
    pub fn embedding_probe(&self) -> EmbeddingProbe {
        EmbeddingProbe::new(PROBE_TEXT, self.store.embedder())
    }
}
