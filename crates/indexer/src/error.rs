use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Index store error: {0}")]
    StoreError(#[from] script_index_store::StoreError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Cannot read source {path}: {reason}")]
    SourceRead { path: String, reason: String },

    #[error("Cannot list sources: {0}")]
    Listing(String),

    #[error("Invalid source path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}

impl IndexerError {
    pub fn source_read(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
