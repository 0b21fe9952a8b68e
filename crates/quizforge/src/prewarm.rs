//! Memoization of expensive text extraction, keyed by content signature.
//!
//! Extraction of uploaded documents is slow enough to be worth caching:
//! re-uploading the same bytes under the same name must not re-run the
//! extractor. The cache also records extraction *failures* so a broken
//! upload does not get re-parsed on every render cycle. For any key, at
//! most one of {text, error} is authoritative; recording text clears a
//! previously recorded error.
//!
//! Session-scoped, in-memory only. No disk I/O at this layer.

use moka::sync::Cache;

use crate::extract::SourceKind;
use crate::signature::Signature;

#[derive(Debug, Clone)]
enum PrewarmEntry {
    Text(String),
    Error(String),
}

/// Session cache mapping `(kind, signature)` to extracted text or a
/// recorded extraction error.
pub struct PrewarmCache {
    entries: Cache<(SourceKind, Signature), PrewarmEntry>,
}

impl PrewarmCache {
    /// Creates a cache bounded to `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Returns cached extracted text, if any.
    pub fn get_text(&self, kind: SourceKind, signature: &Signature) -> Option<String> {
        match self.entries.get(&(kind, signature.clone())) {
            Some(PrewarmEntry::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Records extracted text, replacing any recorded error for the key.
    pub fn set_text(&self, kind: SourceKind, signature: Signature, text: String) {
        self.entries.insert((kind, signature), PrewarmEntry::Text(text));
    }

    /// Returns the recorded extraction error message, if any.
    pub fn get_error(&self, kind: SourceKind, signature: &Signature) -> Option<String> {
        match self.entries.get(&(kind, signature.clone())) {
            Some(PrewarmEntry::Error(message)) => Some(message),
            _ => None,
        }
    }

    /// Records an extraction failure for the key.
    pub fn set_error(&self, kind: SourceKind, signature: Signature, message: String) {
        self.entries
            .insert((kind, signature), PrewarmEntry::Error(message));
    }

    /// Clears a recorded error. Cached text for the key is left alone.
    pub fn clear_error(&self, kind: SourceKind, signature: &Signature) {
        let key = (kind, signature.clone());
        if matches!(self.entries.get(&key), Some(PrewarmEntry::Error(_))) {
            self.entries.invalidate(&key);
        }
    }
}

impl Default for PrewarmCache {
    fn default() -> Self {
        Self::new(64)
    }
}
