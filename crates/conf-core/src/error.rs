//! Error taxonomy for engine operations

use conf_meta::{Scope, ValueType};
use conf_store::SourceKind;

/// Result type for conf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by engine operations.
///
/// Validation errors (`NotFound`, `TypeMismatch`, `PermissionDenied`) are
/// returned synchronously and never partially applied. `Storage` failures
/// abort a mutation before any cache invalidation or notification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown appid/resource/subpath, or unknown key within the scope.
    ///
    /// Schema files that are missing or fail to parse surface as this for
    /// every key under the scope.
    #[error("not found: {scope} key [{}]", .key.as_deref().unwrap_or("*"))]
    NotFound { scope: Scope, key: Option<String> },

    /// `set` value does not match the key's schema type
    #[error("type mismatch for [{key}]: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        actual: ValueType,
    },

    /// Write against a readonly key
    #[error("permission denied: [{key}] is readonly")]
    PermissionDenied { key: String },

    /// Two layers of the same kind claim the same priority for one key —
    /// a configuration-authoring bug, reported rather than silently
    /// resolved
    #[error("conflicting {kind} layers at priority {priority} for [{key}]")]
    ConflictingLayer {
        key: String,
        kind: SourceKind,
        priority: i32,
    },

    /// Persistence of an override layer failed
    #[error(transparent)]
    Storage(#[from] conf_store::Error),

    /// A watch key filter is not a valid regular expression
    #[error("invalid key filter: {0}")]
    KeyFilter(#[from] regex::Error),
}

impl Error {
    /// Shorthand for a scope-level [`Error::NotFound`].
    pub fn scope_not_found(scope: &Scope) -> Self {
        Self::NotFound {
            scope: scope.clone(),
            key: None,
        }
    }

    /// Shorthand for a key-level [`Error::NotFound`].
    pub fn key_not_found(scope: &Scope, key: &str) -> Self {
        Self::NotFound {
            scope: scope.clone(),
            key: Some(key.to_string()),
        }
    }
}
