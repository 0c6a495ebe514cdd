//! Cosine similarity and best-match scanning over stored embeddings.

/// Best-scoring candidate from a similarity scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Position of the candidate in scan order
    pub position: usize,
    /// Cosine similarity score
    pub score: f32,
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 instead of failing when either vector is empty, the lengths
/// differ, or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot_product / (norm_a * norm_b)
}

/// Compute L2 norm of a vector.
fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Round a score to 4 decimal places.
pub fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

/// Scan `candidates` in order and return the single best match.
///
/// Only strictly improving scores replace the current best, so the first
/// candidate wins ties. Candidates scoring 0.0 or less never match.
pub fn best_match<'a, I>(query: &[f32], candidates: I) -> Option<SearchResult>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut best: Option<SearchResult> = None;
    let mut best_score = 0.0_f32;

    for (position, embedding) in candidates.into_iter().enumerate() {
        let score = cosine_similarity(query, embedding);
        if score > best_score {
            best_score = score;
            best = Some(SearchResult { position, score });
        }
    }

    best
}
