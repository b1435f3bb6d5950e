use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use semstore_core::Document;
use serde::{Deserialize, Serialize};

use crate::cli::ProviderKind;

/// On-disk wrapper around an exported document list.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SnapshotFile {
    pub provider: ProviderKind,
    pub embedding_model: String,
    pub dimension: usize,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl SnapshotFile {
    /// `Ok(None)` when the file does not exist yet.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading snapshot {}", path.display()))
            }
        };
        let snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        Ok(Some(snapshot))
    }

    /// Writes to a sibling temp file first so a failed write never truncates
    /// the previous snapshot.
    pub fn write(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            serde_json::to_writer_pretty(&mut file, self)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)
            .with_context(|| format!("replacing snapshot {}", path.display()))?;
        tracing::debug!(path = %path.display(), documents = self.documents.len(), "snapshot written");
        Ok(())
    }
}
