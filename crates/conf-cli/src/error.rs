//! CLI error type

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the terminal
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid or missing arguments
    #[error("{0}")]
    User(String),

    /// Engine operation failure
    #[error(transparent)]
    Engine(#[from] conf_core::Error),

    /// I/O failure while writing output
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON rendering failure
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// A user-facing argument error.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }
}
