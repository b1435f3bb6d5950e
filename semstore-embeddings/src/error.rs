use semstore_core::{EmbeddingError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingProviderError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("missing API key: set {var}")]
    MissingApiKey { var: &'static str },
    #[error("invalid provider configuration: {0}")]
    Config(String),
}

impl From<EmbeddingProviderError> for EmbeddingError {
    fn from(error: EmbeddingProviderError) -> Self {
        match error {
            EmbeddingProviderError::InvalidResponse(message) => {
                EmbeddingError::InvalidResponse(message)
            }
            EmbeddingProviderError::Request(message) => EmbeddingError::Provider(message),
            other => EmbeddingError::Other(Box::new(other)),
        }
    }
}

impl From<EmbeddingProviderError> for StoreError {
    fn from(error: EmbeddingProviderError) -> Self {
        match error {
            EmbeddingProviderError::MissingApiKey { .. } | EmbeddingProviderError::Config(_) => {
                StoreError::Configuration(error.to_string())
            }
            other => StoreError::embedding("provider", other.into()),
        }
    }
}

#[cfg(any(feature = "openai", feature = "ollama"))]
pub(crate) fn check_dimension(
    expected: usize,
    embedding: &[f32],
) -> Result<(), EmbeddingProviderError> {
    if embedding.len() != expected {
        return Err(EmbeddingProviderError::InvalidResponse(format!(
            "expected embedding dimension {}, got {}",
            expected,
            embedding.len()
        )));
    }
    Ok(())
}
