//! Append-only log of answered questions, kept for diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    pub question: String,
    pub timestamp: DateTime<Utc>,
    /// Store size when the question was asked
    pub documents_count: usize,
}

#[derive(Debug, Default)]
pub struct QueryHistory {
    records: Vec<QueryRecord>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question: &str, documents_count: usize) {
        self.records.push(QueryRecord {
            question: question.to_string(),
            timestamp: Utc::now(),
            documents_count,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn last(&self) -> Option<&QueryRecord> {
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
