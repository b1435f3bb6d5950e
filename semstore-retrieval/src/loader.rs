use std::fs;
use std::path::{Path, PathBuf};

use crate::LoaderError;

/// Reads UTF-8 text files.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<String, LoaderError> {
        fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Extracts the text layer of PDF files.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    #[cfg(feature = "pdf")]
    pub fn load(&self, path: &Path) -> Result<String, LoaderError> {
        let bytes = fs::read(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        pdf_extract::extract_text_from_mem(&bytes).map_err(|err| LoaderError::Extract {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    #[cfg(not(feature = "pdf"))]
    pub fn load(&self, path: &Path) -> Result<String, LoaderError> {
        Err(LoaderError::PdfDisabled(path.to_path_buf()))
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Loads one file off the async runtime, picking the loader by extension.
pub async fn load_file_async(path: PathBuf) -> Result<String, LoaderError> {
    tokio::task::spawn_blocking(move || {
        if is_pdf(&path) {
            PdfLoader::new().load(&path)
        } else {
            TextLoader::new().load(&path)
        }
    })
    .await
    .map_err(|err| LoaderError::Join(err.to_string()))?
}

/// Loads files in order, returning each path alongside its text.
pub async fn load_files_async(
    paths: Vec<PathBuf>,
) -> Result<Vec<(PathBuf, String)>, LoaderError> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let text = load_file_async(path.clone()).await?;
        tracing::debug!(path = %path.display(), chars = text.len(), "loaded file");
        out.push((path, text));
    }
    Ok(out)
}
