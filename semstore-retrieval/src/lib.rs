mod config;
mod error;
mod loader;
mod splitter;
mod store;

pub use config::{StoreConfig, VectorStoreBuilder};
pub use error::LoaderError;
pub use loader::{load_file_async, load_files_async, PdfLoader, TextLoader};
pub use splitter::{chunk_documents, TextSplitter};
pub use store::InMemoryVectorStore;

pub use semstore_core::{
    cosine_similarity, Document, DocumentFilter, Embedding, EmbeddingError, ErrorKind,
    MetadataFilter, SearchOptions, SearchResult, StoreError, Value,
};
