use crate::document::IndexDocument;
use crate::error::{Result, StoreError};
use crate::repair::repair;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const DEFAULT_INDEX_FILE_NAME: &str = "script_index.json";

/// Owner of one persisted index file. Callers must not run two writers
/// against the same path.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed JSON of the index file, `None` when the file does not exist.
    pub async fn load_raw(&self) -> Result<Option<Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Load and repair the index. A missing file is an empty document; an
    /// unreadable or non-JSON file is an error the caller can recover from by
    /// rebuilding.
    pub async fn load(&self) -> Result<IndexDocument> {
        match self.load_raw().await? {
            Some(raw) => {
                let document = repair(&raw);
                log::debug!(
                    "Loaded {} scripts from {}",
                    document.len(),
                    self.path.display()
                );
                Ok(document)
            }
            None => {
                log::debug!("No index at {}, starting empty", self.path.display());
                Ok(IndexDocument::new())
            }
        }
    }

    /// Write the document as indented JSON. The file is written next to the
    /// target and renamed over it, so readers see either the old or the new
    /// document.
    pub async fn save(&self, document: &IndexDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = temp_path_for(&self.path)?;
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        log::info!(
            "Saved {} scripts to {}",
            document.total_scripts(),
            self.path.display()
        );
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::InvalidPath(format!("{} has no file name", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}
