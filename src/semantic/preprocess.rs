//! Text trimming helpers shared by the store and the retrieval engine.
//!
//! All limits are counted in characters, never bytes, so multi-byte text is
//! never split inside a UTF-8 sequence.

/// Suffix appended when an excerpt is truncated
pub const TRUNCATION_SUFFIX: &str = "...";

/// Length of a text in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// First `max_chars` characters of `text`, with `...` appended only when
/// something was cut off.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{}{}", head, TRUNCATION_SUFFIX)
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(char_len("abc"), 3);
        assert_eq!(char_len("知识库"), 3);
        assert_eq!(char_len(""), 0);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hi", 5), "hi");
        assert_eq!(truncate_chars("知识库问答", 2), "知识");
    }

    #[test]
    fn test_excerpt_no_truncation_for_short_content() {
        assert_eq!(excerpt("Short text", 100), "Short text");
        assert_eq!(excerpt(&"x".repeat(100), 100), "x".repeat(100));
    }

    #[test]
    fn test_excerpt_truncation() {
        let long_content = "x".repeat(150);
        let result = excerpt(&long_content, 100);

        assert!(result.ends_with(TRUNCATION_SUFFIX));
        assert_eq!(char_len(&result), 100 + TRUNCATION_SUFFIX.len());
    }

    #[test]
    fn test_excerpt_multibyte() {
        assert_eq!(excerpt("知识库问答系统", 3), "知识库...");
    }
}
