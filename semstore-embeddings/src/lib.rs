mod error;
mod hash;

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "ollama")]
mod ollama;

pub use error::EmbeddingProviderError;
pub use hash::HashEmbedder;

#[cfg(feature = "openai")]
pub use openai::{OpenAiEmbedding, OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV};

#[cfg(feature = "ollama")]
pub use ollama::OllamaEmbedding;

/// Checks a provider model identifier before it is sent anywhere.
pub fn validate_model_name(model: &str) -> Result<(), EmbeddingProviderError> {
    if model.trim().is_empty() {
        return Err(EmbeddingProviderError::Config(
            "model name cannot be empty".to_string(),
        ));
    }
    if model.chars().any(char::is_whitespace) {
        return Err(EmbeddingProviderError::Config(format!(
            "model name '{model}' must not contain whitespace"
        )));
    }
    Ok(())
}
