use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the core crate. Retrieval itself never fails; these cover
/// configuration and the file loader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config key '{key}': {source}")]
    ConfigKey {
        key: String,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
