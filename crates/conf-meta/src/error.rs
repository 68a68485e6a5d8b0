//! Error types for conf-meta

use std::path::{Path, PathBuf};

/// Result type for conf-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or querying schemas
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No schema file exists for the requested coordinates
    #[error("no schema for appid [{appid}] resource [{resource}] subpath [{subpath}]")]
    SchemaNotFound {
        appid: String,
        resource: String,
        subpath: String,
    },

    /// A schema file exists but is not a valid configuration description
    #[error("invalid schema {path}: {reason}")]
    InvalidSchema { path: PathBuf, reason: String },

    /// I/O failure while reading a schema file or scanning an install root
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse failure for a schema file
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
