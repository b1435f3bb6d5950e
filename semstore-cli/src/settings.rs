use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use semstore_core::{Embedding, EmbeddingError, StoreError};
use semstore_embeddings::{validate_model_name, HashEmbedder};
use semstore_retrieval::{InMemoryVectorStore, StoreConfig};

use crate::cli::{Cli, ProviderKind};
use crate::snapshot::SnapshotFile;

pub type DynStore = InMemoryVectorStore<Arc<dyn Embedding>>;

/// Resolved embedding settings: explicit flags win, then the snapshot on
/// disk, then the provider's defaults.
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub provider: ProviderKind,
    pub model: String,
    pub dimension: usize,
    pub ollama_url: String,
}

impl Settings {
    pub fn resolve(cli: &Cli, snapshot: Option<&SnapshotFile>) -> Result<Self> {
        let provider = cli
            .provider
            .or_else(|| snapshot.map(|s| s.provider))
            .unwrap_or(ProviderKind::Hash);
        let model = cli
            .model
            .clone()
            .or_else(|| snapshot.map(|s| s.embedding_model.clone()))
            .unwrap_or_else(|| provider.default_model().to_string());
        let dimension = cli
            .dimension
            .or_else(|| snapshot.map(|s| s.dimension))
            .unwrap_or_else(|| provider.default_dimension());
        validate_model_name(&model)?;

        if let Some(snapshot) = snapshot {
            if snapshot.provider != provider {
                return Err(StoreError::Configuration(format!(
                    "snapshot was built with the {:?} provider but {:?} was requested",
                    snapshot.provider, provider
                ))
                .into());
            }
            if snapshot.embedding_model != model || snapshot.dimension != dimension {
                return Err(StoreError::Configuration(format!(
                    "snapshot was built with {} ({} dims) but {} ({} dims) was requested",
                    snapshot.embedding_model, snapshot.dimension, model, dimension
                ))
                .into());
            }
        }

        Ok(Self {
            provider,
            model,
            dimension,
            ollama_url: cli.ollama_url.clone(),
        })
    }

    pub fn store_config(&self) -> Result<StoreConfig, StoreError> {
        StoreConfig::new(self.model.clone(), self.dimension)
    }

    pub fn build_provider(&self) -> Result<Arc<dyn Embedding>> {
        let provider: Arc<dyn Embedding> = match self.provider {
            ProviderKind::Hash => Arc::new(HashEmbedder::new(self.dimension)),
            ProviderKind::OpenAi => openai(self)?,
            ProviderKind::Ollama => ollama(self)?,
        };
        Ok(provider)
    }

    /// With `with_provider == false` the store gets a stand-in that refuses to
    /// embed, so read-only commands work without provider credentials.
    pub fn build_store(&self, with_provider: bool) -> Result<DynStore> {
        let provider: Arc<dyn Embedding> = if with_provider {
            self.build_provider()?
        } else {
            Arc::new(NotLoaded {
                provider: self.provider,
                dimension: self.dimension,
            })
        };
        let store = InMemoryVectorStore::builder(provider)
            .config(self.store_config()?)
            .build()?;
        Ok(store)
    }
}

struct NotLoaded {
    provider: ProviderKind,
    dimension: usize,
}

impl NotLoaded {
    fn error(&self) -> EmbeddingError {
        EmbeddingError::Provider(format!(
            "the {:?} provider is not loaded for this command",
            self.provider
        ))
    }
}

#[async_trait]
impl Embedding for NotLoaded {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(self.error())
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(self.error())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(feature = "openai")]
fn openai(settings: &Settings) -> Result<Arc<dyn Embedding>> {
    let provider = semstore_embeddings::OpenAiEmbedding::from_env(
        settings.model.clone(),
        settings.dimension,
    )
    .map_err(StoreError::from)?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "openai"))]
fn openai(_settings: &Settings) -> Result<Arc<dyn Embedding>> {
    anyhow::bail!(StoreError::Configuration(
        "the openai provider is not compiled in; rebuild with the `openai` feature".to_string()
    ))
}

#[cfg(feature = "ollama")]
fn ollama(settings: &Settings) -> Result<Arc<dyn Embedding>> {
    let provider = semstore_embeddings::OllamaEmbedding::new(
        settings.ollama_url.clone(),
        settings.model.clone(),
        settings.dimension,
    )
    .map_err(StoreError::from)?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "ollama"))]
fn ollama(_settings: &Settings) -> Result<Arc<dyn Embedding>> {
    anyhow::bail!(StoreError::Configuration(
        "the ollama provider is not compiled in; rebuild with the `ollama` feature".to_string()
    ))
}

/// Reads the snapshot (if any), builds the store and imports its documents.
/// The embedding provider is only constructed for commands that embed text.
pub fn open_store(cli: &Cli) -> Result<(Settings, DynStore)> {
    let snapshot = SnapshotFile::read(&cli.snapshot)?;
    let settings = Settings::resolve(cli, snapshot.as_ref())?;
    let store = settings.build_store(cli.command.needs_provider())?;
    if let Some(snapshot) = snapshot {
        let imported = store.import(snapshot.documents)?;
        tracing::debug!(imported, path = %cli.snapshot.display(), "snapshot loaded");
    }
    Ok((settings, store))
}

pub fn save_store(cli: &Cli, settings: &Settings, store: &DynStore) -> Result<()> {
    let snapshot = SnapshotFile {
        provider: settings.provider,
        embedding_model: settings.model.clone(),
        dimension: settings.dimension,
        documents: store.export(),
    };
    snapshot.write(&cli.snapshot)
}
