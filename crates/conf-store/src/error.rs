//! Error types for conf-store

use std::path::{Path, PathBuf};

/// Result type for conf-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while persisting or loading override layers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while reading or writing layer storage
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Advisory lock on a layer file could not be acquired
    #[error("failed to lock {path}")]
    Lock { path: PathBuf },

    /// A persisted layer or vendor override file is not valid JSON
    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Construct an [`Error::Io`] capturing the offending path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
