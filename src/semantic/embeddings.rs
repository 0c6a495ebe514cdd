//! Hash-based pseudo embeddings.
//!
//! Maps text to a fixed-length vector without any model:
//! - Lowercase and whitespace-split into words, keeping at most `dimensions` words
//! - Each word becomes one value in [0, 0.999], derived from its MD5 digest
//! - The vector is right-padded with zeros up to `dimensions`
//!
//! The value at position `i` only depends on the `i`-th word, so this is a
//! bag-of-positions hash, not a semantic representation. Identical text always
//! yields an identical vector, across runs and machines.

/// Default embedding length.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Deterministic text-to-vector mapper with a fixed output length.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Get the embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Generate an embedding for a single text.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        embed(text, self.dimensions)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

/// Embed `text` into exactly `dimensions` values.
///
/// Long texts are truncated by word count, short texts are zero-padded.
pub fn embed(text: &str, dimensions: usize) -> Vec<f32> {
    let lowered = text.to_lowercase();

    let mut embedding: Vec<f32> = lowered
        .split_whitespace()
        .take(dimensions)
        .map(word_value)
        .collect();

    embedding.resize(dimensions, 0.0);
    embedding
}

/// Value of a single (already lowercased) word.
///
/// The digest is read as a big-endian 128-bit integer, reduced modulo 10000,
/// then modulo 1000, then scaled by 1/1000.
pub fn word_value(word: &str) -> f32 {
    let digest = md5::compute(word.as_bytes());
    let bucket = u128::from_be_bytes(digest.0) % 10_000 % 1_000;
    bucket as f32 / 1000.0
}
