use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Chunking failed: {0}")]
    Chunking(#[from] crate::error::ConfigError),

    #[error("Model call failed: {0}")]
    Provider(#[from] crate::error::ProviderError),

    #[error("Model output could not be parsed: {0}")]
    Parse(#[from] crate::error::ParseError),
}
