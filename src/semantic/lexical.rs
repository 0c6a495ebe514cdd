//! Lexical (keyword) signatures and overlap ranking.
//!
//! Keyword signatures are the lowercase, whitespace-separated leading tokens
//! of a text. They back the fallback tier of retrieval when the hash
//! embedding finds nothing above threshold.

use std::collections::BTreeSet;

/// Default number of leading tokens kept in a keyword signature.
pub const DEFAULT_MAX_KEYWORDS: usize = 10;

/// Result of lexical scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalResult {
    /// Position of the document in scan order
    pub position: usize,
    /// Keywords shared by the query and the document, sorted
    pub matched: Vec<String>,
}

impl LexicalResult {
    /// Number of query terms matched
    pub fn matched_terms(&self) -> usize {
        self.matched.len()
    }
}

/// Extract the keyword signature of `text`.
///
/// Takes the first `max_count` tokens (duplicates included) and deduplicates
/// them, so the signature may hold fewer than `max_count` entries.
pub fn extract_keywords(text: &str, max_count: usize) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .take(max_count)
        .map(str::to_string)
        .collect()
}

/// Tokenize a query into its full lowercase term set.
pub fn tokenize(query: &str) -> BTreeSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Score keyword signatures against a query term set.
///
/// # Returns
/// Results sorted by matched_terms DESC. The sort is stable, so documents
/// with equal overlap keep scan order. Only signatures with at least one
/// shared keyword are returned.
pub fn score_lexical<'a, I>(query_terms: &BTreeSet<String>, signatures: I) -> Vec<LexicalResult>
where
    I: IntoIterator<Item = &'a BTreeSet<String>>,
{
    if query_terms.is_empty() {
        return vec![];
    }

    let mut results: Vec<LexicalResult> = signatures
        .into_iter()
        .enumerate()
        .filter_map(|(position, keywords)| {
            let matched: Vec<String> = query_terms.intersection(keywords).cloned().collect();

            if matched.is_empty() {
                None
            } else {
                Some(LexicalResult { position, matched })
            }
        })
        .collect();

    results.sort_by(|a, b| b.matched_terms().cmp(&a.matched_terms()));

    results
}
