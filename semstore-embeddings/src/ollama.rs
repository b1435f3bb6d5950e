use async_trait::async_trait;
use reqwest::Client;
use semstore_core::{Embedding, EmbeddingError};
use serde::{Deserialize, Serialize};

use crate::error::check_dimension;
use crate::{validate_model_name, EmbeddingProviderError};

#[derive(Clone, Debug)]
pub struct OllamaEmbedding {
    base_url: String,
    model: String,
    dimension: usize,
    http: Client,
}

impl OllamaEmbedding {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, EmbeddingProviderError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(EmbeddingProviderError::Config(
                "base_url cannot be empty".to_string(),
            ));
        }
        let model = model.into();
        validate_model_name(&model)?;
        if dimension == 0 {
            return Err(EmbeddingProviderError::Config(
                "dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            base_url,
            model,
            dimension,
            http: Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedding for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.base_url.trim_end_matches('/'));
        let req = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };
        let response: OllamaEmbeddingResponse = self
            .http
            .post(url)
            .json(&req)
            .send()
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?
            .error_for_status()
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?
            .json()
            .await
            .map_err(|err| EmbeddingProviderError::InvalidResponse(err.to_string()))?;

        check_dimension(self.dimension, &response.embedding)?;
        Ok(response.embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
