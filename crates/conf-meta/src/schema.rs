//! Schema (configuration description) parsing and key metadata
//!
//! A schema file is a JSON document in the configuration description
//! format:
//!
//! ```json
//! {
//!     "magic": "dsg.config.meta",
//!     "version": "1.0",
//!     "contents": {
//!         "export": {
//!             "value": false,
//!             "name": "Export enabled",
//!             "description": "Allow exporting configuration",
//!             "permissions": "readwrite",
//!             "visibility": "public"
//!         }
//!     }
//! }
//! ```
//!
//! Only `value` is required per key. `permissions` defaults to `readwrite`
//! and `visibility` to `public`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Magic string identifying a configuration description document.
pub const SCHEMA_MAGIC: &str = "dsg.config.meta";

/// Write permission of a configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// The key can only ever hold its schema or vendor value
    ReadOnly,
    /// The key accepts `set`/`reset` operations
    ReadWrite,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "readonly"),
            Self::ReadWrite => write!(f, "readwrite"),
        }
    }
}

/// Visibility of a configuration key in end-user tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// JSON type class of a configuration value.
///
/// Derived from a key's schema default; `set` operations are validated
/// against it. A `Null` default places no constraint on later values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Whether `value` is acceptable for a key of this type.
    ///
    /// `Null` accepts anything (the schema default carries no type
    /// information), and nothing else accepts `null`.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Null => true,
            other => *other == Self::of(value),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// Raw per-key entry as stored in a schema file
#[derive(Debug, Clone, Deserialize)]
struct RawKeyEntry {
    value: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    permissions: Option<Permission>,
    #[serde(default)]
    visibility: Option<Visibility>,
}

/// Raw schema document
#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(default)]
    magic: Option<String>,
    version: String,
    contents: BTreeMap<String, RawKeyEntry>,
}

/// Metadata for a single configuration key.
///
/// Immutable once the owning [`Schema`] is loaded.
#[derive(Debug, Clone)]
pub struct KeyMeta {
    /// Display name; falls back to the key itself when the schema omits it
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Schema default value
    pub default_value: Value,
    /// Type class derived from the default value
    pub value_type: ValueType,
    /// Whether the key accepts writes
    pub permission: Permission,
    /// Whether end-user tooling should surface the key
    pub visibility: Visibility,
}

/// A loaded configuration description: one resource's key set.
///
/// The schema is the authority on which keys exist, their defaults, and
/// their write permission. It is read-only after load.
#[derive(Debug, Clone)]
pub struct Schema {
    version: String,
    keys: BTreeMap<String, KeyMeta>,
}

impl Schema {
    /// Parse a schema from JSON text.
    ///
    /// # Arguments
    ///
    /// * `path` - origin of the text, used for error reporting only
    /// * `text` - the JSON document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and
    /// [`Error::InvalidSchema`] when the magic string does not match.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let raw: RawSchema = serde_json::from_str(text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(magic) = &raw.magic {
            if magic != SCHEMA_MAGIC {
                return Err(Error::InvalidSchema {
                    path: path.to_path_buf(),
                    reason: format!("unexpected magic [{}]", magic),
                });
            }
        }

        let keys = raw
            .contents
            .into_iter()
            .map(|(key, entry)| {
                let meta = KeyMeta {
                    name: entry.name.unwrap_or_else(|| key.clone()),
                    description: entry.description.unwrap_or_default(),
                    value_type: ValueType::of(&entry.value),
                    default_value: entry.value,
                    permission: entry.permissions.unwrap_or(Permission::ReadWrite),
                    visibility: entry.visibility.unwrap_or(Visibility::Public),
                };
                (key, meta)
            })
            .collect();

        Ok(Self {
            version: raw.version,
            keys,
        })
    }

    /// Schema version string, e.g. `"1.0"`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Metadata for `key`, or `None` if the schema does not define it.
    pub fn key(&self, key: &str) -> Option<&KeyMeta> {
        self.keys.get(key)
    }

    /// All keys in lexicographic order.
    pub fn key_list(&self) -> impl Iterator<Item = (&str, &KeyMeta)> {
        self.keys.iter().map(|(k, m)| (k.as_str(), m))
    }

    /// Number of keys the schema defines.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the schema defines no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
