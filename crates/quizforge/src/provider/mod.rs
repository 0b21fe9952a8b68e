pub mod parse;
pub mod stub;

use secrecy::SecretString;

use crate::error::ProviderError;
use crate::item::GenerationMode;

pub use parse::parse_model_output;
pub use stub::StubClient;

/// API credentials for a remote model provider.
///
/// The key is held as a [`SecretString`] so it never appears in debug
/// output or serialized state.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: SecretString,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
        }
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

/// Token usage reported by a provider for one chunk call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// Raw model output for one chunk.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Per-chunk generation request handed to the model client.
#[derive(Debug, Clone)]
pub struct ChunkRequest<'a> {
    pub mode: GenerationMode,
    /// Number of items to request from this chunk.
    pub count: usize,
    pub model: &'a str,
    /// Optional style hints appended to the prompt.
    pub style: Option<&'a str>,
    pub subject: &'a str,
    pub unit: &'a str,
}

/// Boundary to a remote language model.
///
/// One call per chunk; implementations own retries, timeouts and HTTP
/// plumbing. Calls block the worker thread they run on, never the
/// interactive session.
pub trait ModelClient: Send + Sync {
    fn generate(
        &self,
        chunk: &str,
        request: &ChunkRequest<'_>,
    ) -> Result<ModelResponse, ProviderError>;
}

/// Escapes instruction-token lookalikes before source text is embedded
/// in a prompt, so uploaded material cannot smuggle chat markers in.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
}
