//! Overlapping text windows sized for a model's context budget.
//!
//! Splits normalized source text into ordered character windows of
//! `chunk_size` characters where consecutive windows share `overlap`
//! characters, so content straddling a naive cut point is visible in
//! full to at least one window. Windows are measured in characters,
//! never bytes, so multi-byte input cannot split inside a code point.

use crate::error::ConfigError;

/// Splits `text` into ordered overlapping chunks.
///
/// Every character of `text` appears in at least one chunk and adjacent
/// chunks share exactly `overlap` characters (the final chunk may be
/// shorter). Empty text yields no chunks. Identical inputs always yield
/// identical boundaries.
pub fn split_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> std::result::Result<Vec<String>, ConfigError> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(ConfigError::InvalidChunking {
            chunk_size,
            overlap,
        });
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(Vec::new());
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_count(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let err = split_text("abc", 10, 10).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChunking { .. }));

        let err = split_text("abc", 10, 11).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChunking { .. }));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = split_text("abc", 0, 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChunking { .. }));
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_text("", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("hello world", 100, 10).unwrap();
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_adjacent_chunks_share_exact_overlap() {
        let text: String = ('a'..='z').cycle().take(100).collect();
        let chunks = split_text(&text, 30, 5).unwrap();

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - 5..].iter().collect();
            let head: String = next[..5.min(next.len())].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_full_coverage_no_character_dropped() {
        let text: String = (0..1000).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let chunk_size = 64;
        let overlap = 16;
        let chunks = split_text(&text, chunk_size, overlap).unwrap();

        // Reconstruct by stripping the overlap prefix from every chunk
        // after the first; the result must be the original text.
        let mut rebuilt: String = chunks[0].clone();
        for chunk in &chunks[1..] {
            let suffix: String = chunk.chars().skip(overlap).collect();
            rebuilt.push_str(&suffix);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_reference_dimensions() {
        // The production defaults: 8000-char windows with 500-char overlap.
        let text: String = (0..20_000).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let chunks = split_text(&text, 8000, 500).unwrap();

        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(char_count(chunk), 8000);
        }

        let mut rebuilt: String = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk.chars().skip(500).collect::<String>());
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_deterministic_boundaries() {
        let text: String = ('a'..='z').cycle().take(500).collect();
        let a = split_text(&text, 120, 30).unwrap();
        let b = split_text(&text, 120, 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_multibyte_text_never_splits_code_points() {
        let text: String = "수업자료 한글 강의 노트 ".repeat(50);
        let chunks = split_text(&text, 40, 10).unwrap();

        let total: usize = char_count(&text);
        let mut rebuilt: String = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk.chars().skip(10).collect::<String>());
        }
        assert_eq!(char_count(&rebuilt), total);
        assert_eq!(rebuilt, text);
    }
}
