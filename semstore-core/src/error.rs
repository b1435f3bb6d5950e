use std::{error::Error as StdError, fmt, time::Duration};

use thiserror::Error;

#[derive(Debug)]
pub enum EmbeddingError {
    InvalidResponse(String),
    RateLimited { retry_after: Option<Duration> },
    Timeout(Duration),
    Provider(String),
    Other(Box<dyn StdError + Send + Sync>),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingError::InvalidResponse(message) => {
                write!(f, "Embedding invalid response: {message}")
            }
            EmbeddingError::RateLimited { retry_after } => match retry_after {
                Some(duration) => write!(f, "Embedding rate limited (retry_after={duration:?})"),
                None => write!(f, "Embedding rate limited (retry_after=unknown)"),
            },
            EmbeddingError::Timeout(duration) => write!(f, "Embedding timeout after {duration:?}"),
            EmbeddingError::Provider(message) => write!(f, "Embedding provider error: {message}"),
            EmbeddingError::Other(error) => write!(f, "Embedding error: {error}"),
        }
    }
}

impl StdError for EmbeddingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EmbeddingError::Other(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("failed to generate embedding for {subject}: {source}")]
    EmbeddingGeneration {
        subject: String,
        #[source]
        source: EmbeddingError,
    },
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("document '{id}' is missing embedding")]
    MissingEmbedding { id: String },
    #[error("invalid document id: {0:?}")]
    InvalidId(String),
    #[error("invalid search options: {0}")]
    InvalidOptions(String),
    #[error("batch aborted at input {index} (id '{id}'): {source}")]
    Batch {
        index: usize,
        id: String,
        #[source]
        source: Box<StoreError>,
    },
}

/// Coarse classification of a [`StoreError`], looking through batch wrappers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    EmbeddingGeneration,
    DimensionMismatch,
    MissingEmbedding,
    InvalidId,
    InvalidOptions,
}

impl StoreError {
    pub fn embedding(subject: impl Into<String>, source: EmbeddingError) -> Self {
        StoreError::EmbeddingGeneration {
            subject: subject.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Configuration(_) => ErrorKind::Configuration,
            StoreError::EmbeddingGeneration { .. } => ErrorKind::EmbeddingGeneration,
            StoreError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            StoreError::MissingEmbedding { .. } => ErrorKind::MissingEmbedding,
            StoreError::InvalidId(_) => ErrorKind::InvalidId,
            StoreError::InvalidOptions(_) => ErrorKind::InvalidOptions,
            StoreError::Batch { source, .. } => source.kind(),
        }
    }
}
