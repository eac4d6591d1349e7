use crate::error::{IndexerError, Result};
use crate::scanner::FileScanner;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One script a provider can serve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRef {
    /// Provider-relative path with forward slashes
    pub path: String,
    /// File base name, the index key
    pub name: String,
}

impl SourceRef {
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path.as_str())
            .to_string();
        Self { path, name }
    }
}

/// Where script text comes from
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Human-readable origin for logs
    fn describe(&self) -> String;

    /// Every script the provider can serve, in a stable order
    async fn list_sources(&self) -> Result<Vec<SourceRef>>;

    /// UTF-8 text of one script
    async fn fetch_text(&self, source: &SourceRef) -> Result<String>;
}

/// Scripts under a local directory
pub struct LocalSource {
    scanner: FileScanner,
}

impl LocalSource {
    pub fn new(root: impl AsRef<Path>, extension: &str) -> Self {
        Self {
            scanner: FileScanner::new(root, extension),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.scanner.root()
    }

    fn absolute(&self, source: &SourceRef) -> Result<PathBuf> {
        let relative = Path::new(&source.path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(IndexerError::InvalidPath(source.path.clone()));
        }
        Ok(self.scanner.root().join(relative))
    }
}

#[async_trait]
impl SourceProvider for LocalSource {
    fn describe(&self) -> String {
        format!("{} (*.{})", self.root().display(), self.scanner.extension())
    }

    async fn list_sources(&self) -> Result<Vec<SourceRef>> {
        let root = self.scanner.root();
        if !root.is_dir() {
            return Err(IndexerError::Listing(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(self
            .scanner
            .scan()
            .iter()
            .map(|path| SourceRef::from_path(self.scanner.relative_path(path)))
            .collect())
    }

    async fn fetch_text(&self, source: &SourceRef) -> Result<String> {
        let path = self.absolute(source)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|err| IndexerError::source_read(&source.path, err))?;
        decode_utf8(&source.path, bytes)
    }
}

/// Strict UTF-8 decode with the byte-order mark stripped.
pub(crate) fn decode_utf8(path: &str, bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|err| IndexerError::source_read(path, err))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
