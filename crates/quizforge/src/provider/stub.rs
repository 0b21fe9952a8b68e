//! Deterministic offline model client.
//!
//! Used by tests and as the default wiring when no provider credentials
//! are configured, so every flow stays exercisable without network
//! access or API spend. Output is a pure function of the chunk and the
//! request.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ProviderError;
use crate::item::GenerationMode;
use crate::provider::{ChunkRequest, ModelClient, ModelResponse, TokenUsage};

enum StubBehavior {
    Answer,
    FailNetwork(String),
    Malformed,
}

pub struct StubClient {
    behavior: StubBehavior,
    calls: AtomicUsize,
}

impl StubClient {
    /// A stub that answers every request with well-formed items.
    pub fn new() -> Self {
        Self {
            behavior: StubBehavior::Answer,
            calls: AtomicUsize::new(0),
        }
    }

    /// A stub whose every call fails with a network error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: StubBehavior::FailNetwork(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A stub that returns output the parser cannot understand.
    pub fn malformed() -> Self {
        Self {
            behavior: StubBehavior::Malformed,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelClient for StubClient {
    fn generate(
        &self,
        chunk: &str,
        request: &ChunkRequest<'_>,
    ) -> Result<ModelResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            StubBehavior::FailNetwork(message) => Err(ProviderError::Network(message.clone())),
            StubBehavior::Malformed => Ok(ModelResponse {
                text: "### not a question block ###".to_string(),
                usage: None,
            }),
            StubBehavior::Answer => {
                // A stable, human-readable fingerprint of the chunk so
                // tests can assert on chunk ordering in merged output.
                let fingerprint: String = chunk.chars().take(12).collect();
                let mut text = String::new();

                for i in 1..=request.count.max(1) {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    match request.mode {
                        GenerationMode::MultipleChoice => {
                            text.push_str(&format!(
                                "Q: [{subject}/{unit}] Question {i} about \"{fingerprint}\"?\nO*: Correct answer {i}\nO: Distractor {i}a\nO: Distractor {i}b\nE: Stub explanation {i}.\n",
                                subject = request.subject,
                                unit = request.unit,
                            ));
                        }
                        GenerationMode::OpenEnded | GenerationMode::Flashcard => {
                            text.push_str(&format!(
                                "Q: [{subject}/{unit}] Question {i} about \"{fingerprint}\"?\nA: Stub answer {i}.\n",
                                subject = request.subject,
                                unit = request.unit,
                            ));
                        }
                    }
                }

                Ok(ModelResponse {
                    text,
                    usage: Some(TokenUsage {
                        prompt_tokens: (chunk.chars().count() / 4) as u64,
                        completion_tokens: (request.count * 16) as u64,
                    }),
                })
            }
        }
    }
}
