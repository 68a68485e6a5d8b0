//! Tabular enumeration of effective configuration
//!
//! `list` and the export surface share one row shape, ordered
//! lexicographically by `(appid, resource, subpath, key)` so repeated
//! calls with unchanged state are byte-identical — required for CLI and
//! export reproducibility.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scope filters for `list`/`export` enumeration.
///
/// Unset fields enumerate every installed value discovered under the
/// schema roots.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub appid: Option<String>,
    pub resource: Option<String>,
    pub subpath: Option<String>,
}

impl ListFilter {
    /// Restrict to one application.
    pub fn app(appid: impl Into<String>) -> Self {
        Self {
            appid: Some(appid.into()),
            ..Self::default()
        }
    }

    /// Restrict to one resource of one application.
    pub fn resource(appid: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            appid: Some(appid.into()),
            resource: Some(resource.into()),
            ..Self::default()
        }
    }
}

/// One row of the enumeration: a key and its effective value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub appid: String,
    pub resource: String,
    pub subpath: String,
    pub key: String,
    pub value: Value,
    pub is_default: bool,
}
