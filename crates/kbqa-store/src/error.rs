use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("version {0} not found")]
    VersionNotFound(String),
    #[error("section not found: {0}")]
    SectionNotFound(String),
    #[error("section already exists: {0}")]
    DuplicateSection(String),
    #[error("fetching {url} failed: {message}")]
    Fetch { url: String, message: String },
    #[error("no content fetched from {attempted} url(s)")]
    NothingFetched { attempted: usize },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
