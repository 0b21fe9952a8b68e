use crate::error::ExtractError;
use crate::extract::{SourceKind, TextExtractor};

/// Reference extractor for plain-text and markdown uploads.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, name: &str, content: &[u8]) -> Result<String, ExtractError> {
        let text = String::from_utf8(content.to_vec()).map_err(|e| ExtractError::Decode {
            name: name.to_string(),
            source: e,
        })?;

        // Normalize line endings so chunk boundaries are stable across
        // platforms the upload came from.
        Ok(text.replace("\r\n", "\n"))
    }

    fn supports(&self, kind: SourceKind) -> bool {
        matches!(kind, SourceKind::Text)
    }
}
