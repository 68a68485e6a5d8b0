//! Priority-ordered merge of schema defaults and override layers
//!
//! Resolution is a pure function of the current schema and layer set —
//! no ordering dependency on call history. Among layers defining a key the
//! highest priority wins; ties break by source kind, `runtime > user >
//! oem`. A tie that the kind rank cannot break is a configuration-authoring
//! bug and surfaces as [`Error::ConflictingLayer`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use conf_meta::{Schema, Scope};
use conf_store::{LayerSet, OverrideLayer, SourceKind};

use crate::{Error, Result};

/// Which source supplied an effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum Provenance {
    /// No layer overrides the key; the schema default applies
    SchemaDefault,
    /// An override layer won the merge
    Layer { kind: SourceKind, priority: i32 },
}

/// The outcome of resolving one key in one scope.
///
/// Derived, never authoritative: it may be evicted and recomputed at any
/// time with no observable effect other than latency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// The effective value
    pub value: Value,
    /// True iff the winning source is the schema default
    pub is_default: bool,
    /// The winning source
    pub provenance: Provenance,
}

/// Resolve the effective value of `key` within `scope`.
///
/// # Errors
///
/// [`Error::NotFound`] when the schema does not define `key`;
/// [`Error::ConflictingLayer`] when two layers of the same kind claim the
/// winning priority.
pub fn resolve(
    scope: &Scope,
    schema: &Schema,
    layers: &LayerSet,
    key: &str,
) -> Result<ResolvedValue> {
    let meta = schema
        .key(key)
        .ok_or_else(|| Error::key_not_found(scope, key))?;

    let mut candidates: Vec<&OverrideLayer> =
        layers.layers().filter(|l| l.get(key).is_some()).collect();
    candidates.sort_by(|a, b| {
        (b.priority, b.kind.rank()).cmp(&(a.priority, a.kind.rank()))
    });

    match candidates.as_slice() {
        [] => Ok(ResolvedValue {
            value: meta.default_value.clone(),
            is_default: true,
            provenance: Provenance::SchemaDefault,
        }),
        [winner, rest @ ..] => {
            if let Some(second) = rest.first() {
                if second.priority == winner.priority && second.kind == winner.kind {
                    return Err(Error::ConflictingLayer {
                        key: key.to_string(),
                        kind: winner.kind,
                        priority: winner.priority,
                    });
                }
            }
            // a layer entry equal to the default is still an override
            let value = winner
                .get(key)
                .cloned()
                .unwrap_or_else(|| meta.default_value.clone());
            Ok(ResolvedValue {
                value,
                is_default: false,
                provenance: Provenance::Layer {
                    kind: winner.kind,
                    priority: winner.priority,
                },
            })
        }
    }
}
