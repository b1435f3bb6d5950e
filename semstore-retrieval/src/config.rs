use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use semstore_core::{Embedding, StoreError};
use serde::{Deserialize, Serialize};

use crate::InMemoryVectorStore;

/// Fixed settings of a store instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    embedding_model: String,
    dimension: usize,
}

impl StoreConfig {
    pub fn new(embedding_model: impl Into<String>, dimension: usize) -> Result<Self, StoreError> {
        let embedding_model = embedding_model.into();
        if embedding_model.trim().is_empty() {
            return Err(StoreError::Configuration(
                "embedding_model cannot be empty".to_string(),
            ));
        }
        if dimension == 0 {
            return Err(StoreError::Configuration(
                "dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            embedding_model,
            dimension,
        })
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

pub struct VectorStoreBuilder<E> {
    embedder: E,
    embedding_model: Option<String>,
    dimension: Option<usize>,
}

impl<E> fmt::Debug for VectorStoreBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStoreBuilder")
            .field("embedding_model", &self.embedding_model)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl<E> VectorStoreBuilder<E>
where
    E: Embedding,
{
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            embedding_model: None,
            dimension: None,
        }
    }

    pub fn embedding_model(mut self, value: impl Into<String>) -> Self {
        self.embedding_model = Some(value.into());
        self
    }

    /// Defaults to the provider's own dimension when unset.
    pub fn dimension(mut self, value: usize) -> Self {
        self.dimension = Some(value);
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.embedding_model = Some(config.embedding_model);
        self.dimension = Some(config.dimension);
        self
    }

    pub fn build(self) -> Result<InMemoryVectorStore<E>, StoreError> {
        let embedding_model = self.embedding_model.ok_or_else(|| {
            StoreError::Configuration("embedding_model is required".to_string())
        })?;
        let provider_dimension = self.embedder.dimension();
        let config = StoreConfig::new(
            embedding_model,
            self.dimension.unwrap_or(provider_dimension),
        )?;

        if provider_dimension != config.dimension {
            return Err(StoreError::Configuration(format!(
                "provider produces {provider_dimension}-dimensional embeddings but the store expects {}",
                config.dimension
            )));
        }

        tracing::debug!(
            embedding_model = %config.embedding_model,
            dimension = config.dimension,
            "vector store configured"
        );

        Ok(InMemoryVectorStore {
            embedder: self.embedder,
            config,
            inner: Arc::new(RwLock::new(Default::default())),
        })
    }
}
