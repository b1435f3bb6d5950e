//! Core types shared by the semstore crates: documents, the embedding
//! provider seam, metadata filters, cosine similarity and the error taxonomy.

mod document;
mod embedding;
mod error;
mod filter;
mod search;
mod similarity;
mod value;

pub use document::Document;
pub use embedding::Embedding;
pub use error::{EmbeddingError, ErrorKind, StoreError};
pub use filter::{DocumentFilter, MetadataFilter};
pub use search::{SearchOptions, SearchResult, DEFAULT_THRESHOLD, DEFAULT_TOP_K};
pub use similarity::cosine_similarity;
pub use value::Value;
