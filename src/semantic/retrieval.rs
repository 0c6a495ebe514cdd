//! Two-tier retrieval over the document store.
//!
//! A question is answered in up to three steps:
//! 1. Vector phase: cosine similarity between the hash embedding of the
//!    question and every stored embedding. The best document is returned
//!    only if its score is strictly above the similarity threshold.
//! 2. Keyword phase: overlap between the question's term set and every
//!    stored keyword signature. The largest overlap wins, first in store
//!    order on ties, with a fixed confidence.
//! 3. No match: a normal terminal outcome, not an error.
//!
//! The hash embedding is not semantic, hence the hard threshold gate and
//! the lexical fallback.

use serde::Serialize;

use crate::config::Config;
use crate::documents::{Document, DocumentStore};
use crate::semantic::index::{best_match, round4};
use crate::semantic::lexical::{score_lexical, tokenize};
use crate::semantic::preprocess::{excerpt, truncate_chars};

/// Similarity a vector match must strictly exceed
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.1;

/// Confidence reported for keyword matches
pub const DEFAULT_KEYWORD_CONFIDENCE: f32 = 0.5;

/// Characters of the matched document shown in the answer body
const ANSWER_CHARS: usize = 300;

/// Characters of the matched document shown in the source preview
const SOURCE_PREVIEW_CHARS: usize = 100;

const NO_DOCUMENTS_ANSWER: &str = "The knowledge base is empty, please upload documents first.";
const NO_MATCH_ANSWER: &str = "Sorry, no relevant information was found in the knowledge base.\n\n\
    Suggestions:\n\
    1. Upload related documents\n\
    2. Rephrase the question\n\
    3. Use more specific keywords";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RetrievalError {
    #[error("question must not be empty")]
    EmptyQuestion,
}

/// A validated question: trimmed, non-empty, at most the configured length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Trim and validate `raw`. Overlong questions are truncated, not rejected.
    pub fn parse(raw: &str, max_length: usize) -> Result<Self, RetrievalError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RetrievalError::EmptyQuestion);
        }

        Ok(Self(truncate_chars(trimmed, max_length).to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Success,
    KeywordMatch,
    NoMatch,
    NoDocuments,
}

/// Where an answer came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "match_type", rename_all = "snake_case")]
pub enum AnswerSource {
    Vector {
        document_id: u64,
        title: String,
        content_preview: String,
        similarity_score: f32,
    },
    Keyword {
        document_id: u64,
        title: String,
        matched_keywords: Vec<String>,
    },
}

impl AnswerSource {
    pub fn document_id(&self) -> u64 {
        match self {
            AnswerSource::Vector { document_id, .. } | AnswerSource::Keyword { document_id, .. } => {
                *document_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub status: AnswerStatus,
    pub answer: String,
    pub confidence: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<AnswerSource>,

    /// Keyword signature of the matched document (vector matches only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl AnswerResult {
    fn no_documents() -> Self {
        Self {
            status: AnswerStatus::NoDocuments,
            answer: NO_DOCUMENTS_ANSWER.to_string(),
            confidence: 0.0,
            source: None,
            keywords: None,
            suggestions: vec!["Upload related documents before asking".to_string()],
        }
    }

    fn no_match() -> Self {
        Self {
            status: AnswerStatus::NoMatch,
            answer: NO_MATCH_ANSWER.to_string(),
            confidence: 0.0,
            source: None,
            keywords: None,
            suggestions: vec![
                "Check whether the documents are relevant".to_string(),
                "Try asking in a different way".to_string(),
                "Add more detailed descriptions".to_string(),
            ],
        }
    }

    fn vector_match(document: &Document, score: f32) -> Self {
        let confidence = round4(score);
        Self {
            status: AnswerStatus::Success,
            answer: format!(
                "Based on document \"{}\":\n\n{}",
                document.title,
                excerpt(&document.content, ANSWER_CHARS)
            ),
            confidence,
            source: Some(AnswerSource::Vector {
                document_id: document.id,
                title: document.title.clone(),
                content_preview: excerpt(&document.content, SOURCE_PREVIEW_CHARS),
                similarity_score: confidence,
            }),
            keywords: Some(document.keywords.iter().cloned().collect()),
            suggestions: vec![],
        }
    }

    fn keyword_match(document: &Document, matched: Vec<String>, confidence: f32) -> Self {
        Self {
            status: AnswerStatus::KeywordMatch,
            answer: format!(
                "Found a related document by keyword match:\n\n{}",
                excerpt(&document.content, ANSWER_CHARS)
            ),
            confidence,
            source: Some(AnswerSource::Keyword {
                document_id: document.id,
                title: document.title.clone(),
                matched_keywords: matched,
            }),
            keywords: None,
            suggestions: vec![],
        }
    }
}

/// Stateless question answering over a [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    similarity_threshold: f32,
    keyword_confidence: f32,
    max_question_length: usize,
}

impl RetrievalEngine {
    pub fn new(similarity_threshold: f32, keyword_confidence: f32, max_question_length: usize) -> Self {
        Self {
            similarity_threshold,
            keyword_confidence,
            max_question_length,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.retrieval.similarity_threshold,
            config.retrieval.keyword_confidence,
            config.limits.max_question_length,
        )
    }

    /// Validate a raw question against this engine's length limit.
    pub fn parse_question(&self, raw: &str) -> Result<Question, RetrievalError> {
        Question::parse(raw, self.max_question_length)
    }

    /// Validate and answer a raw question.
    #[cfg(test)]
    pub fn ask(&self, store: &DocumentStore, raw: &str) -> Result<AnswerResult, RetrievalError> {
        let question = self.parse_question(raw)?;
        Ok(self.answer(store, &question))
    }

    /// Answer an already validated question.
    pub fn answer(&self, store: &DocumentStore, question: &Question) -> AnswerResult {
        if store.is_empty() {
            return AnswerResult::no_documents();
        }

        let query_embedding = store.embedder().embed(question.as_str());
        let best = best_match(
            &query_embedding,
            store.iter().map(|doc| doc.embedding.as_slice()),
        );

        if let Some(hit) = best {
            log::debug!(
                "best vector match at position {} with score {:.4}",
                hit.position,
                hit.score
            );

            if hit.score > self.similarity_threshold {
                if let Some(document) = store.get(hit.position) {
                    return AnswerResult::vector_match(document, hit.score);
                }
            }
        }

        log::debug!(
            "no vector match above {}, falling back to keywords",
            self.similarity_threshold
        );

        let query_terms = tokenize(question.as_str());
        let lexical = score_lexical(&query_terms, store.iter().map(|doc| &doc.keywords));

        if let Some(top) = lexical.into_iter().next() {
            if let Some(document) = store.get(top.position) {
                return AnswerResult::keyword_match(document, top.matched, self.keyword_confidence);
            }
        }

        AnswerResult::no_match()
    }
}
