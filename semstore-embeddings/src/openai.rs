use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use semstore_core::{Embedding, EmbeddingError};

use crate::error::check_dimension;
use crate::{validate_model_name, EmbeddingProviderError};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Clone)]
pub struct OpenAiEmbedding {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl std::fmt::Debug for OpenAiEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedding")
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OpenAiEmbedding {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, EmbeddingProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(EmbeddingProviderError::MissingApiKey {
                var: OPENAI_API_KEY_ENV,
            });
        }
        let config = OpenAIConfig::default().with_api_key(api_key);
        Self::with_client(Client::with_config(config), model, dimension)
    }

    /// Reads the key from `OPENAI_API_KEY` and, when set, the endpoint from
    /// `OPENAI_BASE_URL`.
    pub fn from_env(
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, EmbeddingProviderError> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(EmbeddingProviderError::MissingApiKey {
                var: OPENAI_API_KEY_ENV,
            })?;
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Ok(base) = std::env::var(OPENAI_BASE_URL_ENV) {
            config = config.with_api_base(base);
        }
        Self::with_client(Client::with_config(config), model, dimension)
    }

    pub fn with_client(
        client: Client<OpenAIConfig>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, EmbeddingProviderError> {
        let model = model.into();
        validate_model_name(&model)?;
        if dimension == 0 {
            return Err(EmbeddingProviderError::Config(
                "dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            client,
            model,
            dimension,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedding for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(text)
            .build()
            .map_err(|err| EmbeddingError::Other(Box::new(err)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| {
                EmbeddingProviderError::InvalidResponse("missing embedding".to_string())
            })?;

        check_dimension(self.dimension, &embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs = texts.to_vec();
        let inputs_len = inputs.len();
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(inputs)
            .build()
            .map_err(|err| EmbeddingError::Other(Box::new(err)))?;

        tracing::debug!(model = %self.model, inputs = inputs_len, "openai embedding batch");
        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?;

        if response.data.len() != inputs_len {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                inputs_len,
                response.data.len()
            ))
            .into());
        }

        let mut data = response.data;
        data.sort_by_key(|item| item.index);
        let mut out = Vec::with_capacity(data.len());
        for item in data {
            check_dimension(self.dimension, &item.embedding)?;
            out.push(item.embedding);
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
