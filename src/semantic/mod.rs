//! Retrieval engine for stored documents.
//!
//! Documents and questions are mapped to deterministic hash embeddings and
//! compared with cosine similarity; keyword overlap is the fallback when no
//! vector match clears the threshold.
//!
//! # Architecture
//!
//! - `embeddings`: Hash-based text to vector mapping
//! - `index`: Cosine similarity and best-match scan
//! - `lexical`: Keyword signatures and overlap ranking
//! - `preprocess`: Character-based truncation and excerpts
//! - `retrieval`: Threshold/fallback policy producing an `AnswerResult`

pub mod embeddings;
mod index;
mod lexical;
mod preprocess;
pub mod retrieval;

pub use embeddings::{HashEmbedder, DEFAULT_DIMENSIONS};
pub use index::round4;
pub use lexical::{extract_keywords, DEFAULT_MAX_KEYWORDS};
pub use preprocess::{char_len, excerpt};
pub use retrieval::{
    AnswerResult, RetrievalEngine, RetrievalError, DEFAULT_KEYWORD_CONFIDENCE,
    DEFAULT_SIMILARITY_THRESHOLD,
};
