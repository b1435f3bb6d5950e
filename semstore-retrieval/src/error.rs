use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text from {path}: {message}")]
    Extract { path: PathBuf, message: String },
    #[error("pdf support is disabled; rebuild with the `pdf` feature to load {0}")]
    PdfDisabled(PathBuf),
    #[error("loader task failed: {0}")]
    Join(String),
}
