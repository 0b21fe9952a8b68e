use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub quality: QualitySettings,
    #[serde(default)]
    pub bank: BankSettings,
    /// Maximum entries in the prewarm (extraction) cache.
    #[serde(default = "default_prewarm_capacity")]
    pub prewarm_capacity: u64,
}

fn default_prewarm_capacity() -> u64 {
    64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            quality: QualitySettings::default(),
            bank: BankSettings::default(),
            prewarm_capacity: default_prewarm_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Chunk window size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Background worker threads for generation jobs.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Model requested when a submission does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_chunk_size() -> usize {
    8000
}

fn default_overlap() -> usize {
    500
}

fn default_worker_count() -> usize {
    // Generation is I/O-bound; a small pool avoids provider rate-limit
    // contention even on large machines.
    num_cpus::get().min(4)
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            worker_count: default_worker_count(),
            default_model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Drop items with too-short stems from merged output.
    #[serde(default = "default_true")]
    pub filter_enabled: bool,
    #[serde(default = "default_min_stem_length")]
    pub min_stem_length: usize,
    /// Stem similarity at or above which an item pair is flagged.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// Drop flagged near-duplicates instead of only surfacing them.
    #[serde(default)]
    pub drop_duplicates: bool,
}

fn default_true() -> bool {
    true
}

fn default_min_stem_length() -> usize {
    10
}

fn default_similarity_threshold() -> f32 {
    0.9
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            filter_enabled: true,
            min_stem_length: default_min_stem_length(),
            similarity_threshold: default_similarity_threshold(),
            drop_duplicates: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankSettings {
    /// Question bank file path. Resolved against the platform data
    /// directory when absent.
    #[serde(default)]
    pub path: Option<String>,
}

/// Cross-field validation the serde layer cannot express.
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.generation.chunk_size == 0
        || settings.generation.overlap >= settings.generation.chunk_size
    {
        return Err(ConfigError::InvalidChunking {
            chunk_size: settings.generation.chunk_size,
            overlap: settings.generation.overlap,
        });
    }

    if settings.generation.worker_count == 0 || settings.generation.worker_count > 16 {
        return Err(ConfigError::Validation {
            message: format!(
                "worker_count must be between 1 and 16, got {}",
                settings.generation.worker_count
            ),
        });
    }

    if !(0.0..=1.0).contains(&settings.quality.similarity_threshold) {
        return Err(ConfigError::Validation {
            message: format!(
                "similarity_threshold must be within [0, 1], got {}",
                settings.quality.similarity_threshold
            ),
        });
    }

    if settings.generation.default_model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "default_model must not be empty".to_string(),
        });
    }

    Ok(())
}
