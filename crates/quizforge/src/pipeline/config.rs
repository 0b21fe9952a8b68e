use crate::item::GenerationMode;
use crate::signature::Signature;

/// Full parameter set for one generation job, covering all chunks of
/// one source document. Built from a queue item plus the session's
/// runtime context; echoed on the job record for display.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Display name of the source document.
    pub source_name: String,
    /// Fingerprint of the source upload.
    pub signature: Signature,
    /// Extracted text the chunks are cut from.
    pub raw_text: String,
    /// Optional style hints forwarded to the model.
    pub style_text: Option<String>,
    pub mode: GenerationMode,
    /// Total number of items requested for the document.
    pub num_items: usize,
    pub subject: String,
    pub unit: String,
    /// Model id from the queue item.
    pub model: String,
    /// Session-level model override; wins over `model` when present.
    pub model_override: Option<String>,
    pub chunk_size: usize,
    pub overlap: usize,
    /// Whether the minimum-stem-length filter runs on merged output.
    pub quality_filter: bool,
    pub min_stem_length: usize,
    /// Stem similarity at or above which an item pair is flagged.
    pub similarity_threshold: f32,
    /// Drop the later item of each flagged pair instead of only
    /// surfacing the flag.
    pub drop_duplicates: bool,
    /// Fine-grained per-chunk progress messages. Disabled on the async
    /// path: background execution has no attached UI to update.
    pub report_progress: bool,
    /// User the job is attributed to in the audit trail.
    pub audit_user: Option<String>,
}

impl GenerationParams {
    /// The model the provider is actually called with.
    pub fn effective_model(&self) -> &str {
        self.model_override.as_deref().unwrap_or(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            source_name: "notes.txt".to_string(),
            signature: Signature::compute("notes.txt", b"body"),
            raw_text: "body".to_string(),
            style_text: None,
            mode: GenerationMode::OpenEnded,
            num_items: 10,
            subject: "Biology".to_string(),
            unit: "Cells".to_string(),
            model: "gpt-4o-mini".to_string(),
            model_override: None,
            chunk_size: 8000,
            overlap: 500,
            quality_filter: true,
            min_stem_length: 10,
            similarity_threshold: 0.9,
            drop_duplicates: false,
            report_progress: false,
            audit_user: None,
        }
    }

    #[test]
    fn test_effective_model_prefers_override() {
        let mut p = params();
        assert_eq!(p.effective_model(), "gpt-4o-mini");
        p.model_override = Some("gpt-4o".to_string());
        assert_eq!(p.effective_model(), "gpt-4o");
    }
}
