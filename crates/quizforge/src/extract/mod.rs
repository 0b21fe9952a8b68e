pub mod text;

use log::debug;

use crate::error::ExtractError;
use crate::prewarm::PrewarmCache;
use crate::signature::Signature;

/// Upload formats the pipeline knows about.
///
/// Only plain text ships with an extractor; the binary formats are
/// extracted by external collaborators registered by the embedding
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Text,
    Pdf,
    Docx,
    Pptx,
    LegacyDoc,
}

impl SourceKind {
    /// Detects the source kind from an upload's display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let mime = mime_guess::from_path(name).first();
        if let Some(mime) = &mime {
            match mime.essence_str() {
                "application/pdf" => return Some(SourceKind::Pdf),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    return Some(SourceKind::Docx)
                }
                "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                    return Some(SourceKind::Pptx)
                }
                "application/msword" => return Some(SourceKind::LegacyDoc),
                _ => {}
            }
            if mime.type_() == mime_guess::mime::TEXT {
                return Some(SourceKind::Text);
            }
        }

        // mime_guess does not know every legacy word-processor suffix.
        let extension = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        match extension.as_str() {
            "hwp" | "hwpx" => Some(SourceKind::LegacyDoc),
            _ => None,
        }
    }
}

pub trait TextExtractor: Send + Sync {
    /// Extracts plain text from raw upload bytes.
    fn extract(&self, name: &str, content: &[u8]) -> Result<String, ExtractError>;

    fn supports(&self, kind: SourceKind) -> bool;
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(text::PlainTextExtractor::new())],
        }
    }

    /// Registers an additional extractor, e.g. a PDF collaborator.
    pub fn register(&mut self, extractor: Box<dyn TextExtractor>) {
        self.extractors.push(extractor);
    }

    /// Routes an upload to the first extractor supporting its kind.
    pub fn extract(&self, name: &str, content: &[u8]) -> Result<String, ExtractError> {
        let kind = SourceKind::from_name(name)
            .ok_or_else(|| ExtractError::UnsupportedFormat(name.to_string()))?;

        for extractor in &self.extractors {
            if extractor.supports(kind) {
                return extractor.extract(name, content);
            }
        }

        Err(ExtractError::UnsupportedFormat(name.to_string()))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoized extraction: consults the prewarm cache before running an
/// extractor and records the outcome (text or failure) either way.
///
/// Returns the upload's signature alongside the extraction result so
/// callers can reuse it for queue deduplication.
pub fn extract_cached(
    cache: &PrewarmCache,
    registry: &ExtractorRegistry,
    name: &str,
    content: &[u8],
) -> (Signature, Result<String, ExtractError>) {
    let signature = Signature::compute(name, content);

    let Some(kind) = SourceKind::from_name(name) else {
        return (
            signature,
            Err(ExtractError::UnsupportedFormat(name.to_string())),
        );
    };

    if let Some(text) = cache.get_text(kind, &signature) {
        debug!("Prewarm cache hit for '{}'", name);
        return (signature, Ok(text));
    }
    if let Some(message) = cache.get_error(kind, &signature) {
        debug!("Prewarm cache replaying recorded failure for '{}'", name);
        return (signature, Err(ExtractError::Failed(message)));
    }

    match registry.extract(name, content) {
        Ok(text) => {
            cache.set_text(kind, signature.clone(), text.clone());
            (signature, Ok(text))
        }
        Err(e) => {
            cache.set_error(kind, signature.clone(), e.to_string());
            (signature, Err(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingExtractor {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl TextExtractor for CountingExtractor {
        fn extract(&self, name: &str, _content: &[u8]) -> Result<String, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ExtractError::Failed(format!("cannot parse '{}'", name)))
            } else {
                Ok("extracted body".to_string())
            }
        }

        fn supports(&self, kind: SourceKind) -> bool {
            kind == SourceKind::Pdf
        }
    }

    #[test]
    fn test_kind_detection() {
        assert_eq!(SourceKind::from_name("notes.txt"), Some(SourceKind::Text));
        assert_eq!(SourceKind::from_name("notes.md"), Some(SourceKind::Text));
        assert_eq!(SourceKind::from_name("slides.pdf"), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_name("paper.docx"), Some(SourceKind::Docx));
        assert_eq!(SourceKind::from_name("deck.pptx"), Some(SourceKind::Pptx));
        assert_eq!(SourceKind::from_name("old.doc"), Some(SourceKind::LegacyDoc));
        assert_eq!(SourceKind::from_name("old.hwp"), Some(SourceKind::LegacyDoc));
        assert_eq!(SourceKind::from_name("archive.xyz123"), None);
    }

    #[test]
    fn test_registry_routes_plain_text() {
        let registry = ExtractorRegistry::new();
        let text = registry.extract("notes.txt", "alpha beta".as_bytes()).unwrap();
        assert_eq!(text, "alpha beta");
    }

    #[test]
    fn test_registry_unsupported_format() {
        let registry = ExtractorRegistry::new();
        let err = registry.extract("slides.pdf", b"%PDF-1.5").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_extract_cached_memoizes_success() {
        let cache = PrewarmCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(CountingExtractor {
            calls: Arc::clone(&calls),
            fail: false,
        }));

        let (sig1, first) = extract_cached(&cache, &registry, "slides.pdf", b"bytes");
        let (sig2, second) = extract_cached(&cache, &registry, "slides.pdf", b"bytes");

        assert_eq!(sig1, sig2);
        assert_eq!(first.unwrap(), "extracted body");
        assert_eq!(second.unwrap(), "extracted body");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_extract_cached_records_and_replays_failure() {
        let cache = PrewarmCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(CountingExtractor {
            calls: Arc::clone(&calls),
            fail: true,
        }));

        let (sig, first) = extract_cached(&cache, &registry, "slides.pdf", b"bytes");
        assert!(first.is_err());
        assert!(cache.get_error(SourceKind::Pdf, &sig).is_some());

        let (_, second) = extract_cached(&cache, &registry, "slides.pdf", b"bytes");
        assert!(matches!(second.unwrap_err(), ExtractError::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_extract_cached_unknown_format_not_cached() {
        let cache = PrewarmCache::default();
        let registry = ExtractorRegistry::new();
        let (_, result) = extract_cached(&cache, &registry, "mystery.bin1234", b"??");
        assert!(matches!(result.unwrap_err(), ExtractError::UnsupportedFormat(_)));
    }
}
