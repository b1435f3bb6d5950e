use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "semstore", version, about = "Semantic document store over a JSON snapshot")]
pub struct Cli {
    /// Snapshot file read before and written after each mutating command.
    #[arg(long, global = true, env = "SEMSTORE_SNAPSHOT", default_value = "semstore.json")]
    pub snapshot: PathBuf,

    /// Embedding provider; defaults to the snapshot's provider, then `hash`.
    #[arg(long, global = true, env = "SEMSTORE_PROVIDER", value_enum)]
    pub provider: Option<ProviderKind>,

    /// Embedding model; defaults to the snapshot's model, then the provider default.
    #[arg(long, global = true, env = "SEMSTORE_MODEL")]
    pub model: Option<String>,

    #[arg(long, global = true, env = "SEMSTORE_DIMENSION")]
    pub dimension: Option<usize>,

    #[arg(long, global = true, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Hash,
    #[value(name = "openai")]
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Hash => "fnv1a-hash",
            ProviderKind::OpenAi => "text-embedding-3-small",
            ProviderKind::Ollama => "nomic-embed-text",
        }
    }

    pub fn default_dimension(self) -> usize {
        match self {
            ProviderKind::Hash => 256,
            ProviderKind::OpenAi => 1536,
            ProviderKind::Ollama => 768,
        }
    }
}

impl Command {
    /// Only these commands call the embedding provider.
    pub fn needs_provider(&self) -> bool {
        matches!(self, Command::Ingest { .. } | Command::Search { .. })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load text or PDF files, chunk them and add the chunks to the store.
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,
        #[arg(long, default_value_t = 200)]
        overlap: usize,
    },
    /// Rank stored documents against a query.
    Search {
        query: String,
        #[arg(long, default_value_t = semstore_core::DEFAULT_TOP_K)]
        top_k: usize,
        #[arg(long, default_value_t = semstore_core::DEFAULT_THRESHOLD, allow_hyphen_values = true)]
        threshold: f32,
        /// Metadata equality filter, `key=value`; repeat to require several.
        #[arg(long = "where", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,
        #[arg(long)]
        json: bool,
    },
    Get {
        id: String,
    },
    Delete {
        id: String,
    },
    List,
    Stats,
    Clear,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
