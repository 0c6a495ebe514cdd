//! Diagnostic reports: status, health and embedding probe.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::semantic::{round4, HashEmbedder};

/// Number of leading embedding values shown in a probe
const PROBE_SAMPLE_VALUES: usize = 10;

/// Text embedded by the built-in probe
pub const PROBE_TEXT: &str =
    "This is a sample text used to test the embedding function, it contains several words.";

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub system: SystemStatus,
    pub performance: PerformanceStatus,
    pub limits: LimitsStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub documents_count: usize,
    pub queries_count: usize,
    pub embedding_dimensions: usize,
    pub max_documents: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStatus {
    pub uptime_secs: i64,
    pub last_query: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LimitsStatus {
    pub max_document_size: usize,
    pub max_question_length: usize,
    pub supported_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Number of documents held in memory
    pub memory_usage: usize,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingProbe {
    pub input_text: String,
    pub dimensions: usize,
    pub sample_values: Vec<f32>,
    pub statistics: EmbeddingStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingStatistics {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl EmbeddingProbe {
    pub fn new(text: &str, embedder: &HashEmbedder) -> Self {
        let embedding = embedder.embed(text);

        Self {
            input_text: text.to_string(),
            dimensions: embedding.len(),
            sample_values: embedding.iter().take(PROBE_SAMPLE_VALUES).copied().collect(),
            statistics: EmbeddingStatistics::of(&embedding),
        }
    }
}

impl EmbeddingStatistics {
    fn of(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }

        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = values.iter().sum::<f32>() / values.len() as f32;

        Self {
            min: round4(min),
            max: round4(max),
            mean: round4(mean),
        }
    }
}
