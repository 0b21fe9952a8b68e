use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizforgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Settings validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid chunking: chunk_size={chunk_size}, overlap={overlap} (overlap must be smaller than chunk_size, chunk_size must be non-zero)")]
    InvalidChunking { chunk_size: usize, overlap: usize },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported upload format: {0}")]
    UnsupportedFormat(String),

    #[error("Upload '{name}' is not valid UTF-8: {source}")]
    Decode {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Text extraction failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited by model provider: {0}")]
    RateLimited(String),

    #[error("Authentication with model provider failed: {0}")]
    Auth(String),

    #[error("Network error calling model provider: {0}")]
    Network(String),

    #[error("Model provider returned status {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Model returned no parseable items")]
    EmptyOutput,

    #[error("Item {item} has no answer line")]
    MissingAnswer { item: usize },

    #[error("Item {item} has {found} options (multiple choice needs at least 2)")]
    MissingOptions { item: usize, found: usize },

    #[error("Item {item}: correct answer does not match any option")]
    AnswerNotInOptions { item: usize },

    #[error("Malformed model output: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read question bank '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write question bank '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Question bank is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuizforgeError>;
