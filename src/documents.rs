use crate::semantic::{char_len, excerpt, extract_keywords, HashEmbedder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Characters shown in a document summary preview
pub const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: u64,

    pub title: String,
    pub content: String,

    #[serde(skip_serializing)]
    pub embedding: Vec<f32>,
    pub keywords: BTreeSet<String>,

    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Content length in characters
    pub fn length(&self) -> usize {
        char_len(&self.content)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocumentCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub id: u64,
    pub title: String,
    pub content_preview: String,
    pub length: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            content_preview: excerpt(&doc.content, PREVIEW_CHARS),
            length: doc.length(),
            created_at: doc.created_at,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("document content must not be empty")]
    EmptyContent,

    #[error("document content is too long ({got} characters, max {max})")]
    ContentTooLong { max: usize, got: usize },
}

/// Ordered, append-only collection of indexed documents.
///
/// Embeddings and keyword signatures are computed eagerly on insert.
/// Ids are `len() + 1` at insertion time, so they restart at 1 after `clear`.
pub struct DocumentStore {
    documents: Vec<Document>,
    embedder: HashEmbedder,
    max_keywords: usize,
    max_content_length: usize,
}

impl DocumentStore {
    pub fn new(embedder: HashEmbedder, max_keywords: usize, max_content_length: usize) -> Self {
        Self {
            documents: Vec::new(),
            embedder,
            max_keywords,
            max_content_length,
        }
    }

    pub fn embedder(&self) -> &HashEmbedder {
        &self.embedder
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    /// Validate, index and append a new document.
    ///
    /// Content is trimmed first. Empty content and content longer than the
    /// configured maximum are rejected; a missing or blank title falls back
    /// to a generated one.
    pub fn add(&mut self, create: DocumentCreate) -> Result<&Document, StoreError> {
        let content = create.content.trim();
        if content.is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let length = char_len(content);
        if length > self.max_content_length {
            return Err(StoreError::ContentTooLong {
                max: self.max_content_length,
                got: length,
            });
        }

        let id = self.documents.len() as u64 + 1;
        let title = create
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| default_title(id));

        let document = Document {
            id,
            title,
            content: content.to_string(),
            embedding: self.embedder.embed(content),
            keywords: extract_keywords(content, self.max_keywords),
            created_at: Utc::now(),
        };

        log::debug!("indexed document {id} ({length} chars)");

        self.documents.push(document);
        Ok(&self.documents[self.documents.len() - 1])
    }

    /// Summaries in insertion order.
    pub fn list(&self) -> Vec<DocumentSummary> {
        self.documents.iter().map(DocumentSummary::from).collect()
    }

    /// Remove every document, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.documents.len();
        self.documents.clear();
        count
    }
}

fn default_title(id: u64) -> String {
    format!("Untitled document {id}")
}
