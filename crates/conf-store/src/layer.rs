//! Override layer records and the per-scope layer set

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use conf_meta::Scope;

/// Origin of an override layer.
///
/// The rank order `Runtime > User > Oem` is the deterministic tie-break
/// between layers claiming the same priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Vendor customization shipped as override files alongside the schema
    Oem,
    /// Per-user override, persisted across sessions
    User,
    /// Value recorded by a `set` operation at runtime
    Runtime,
}

impl SourceKind {
    /// Tie-break rank; higher wins.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Oem => 0,
            Self::User => 1,
            Self::Runtime => 2,
        }
    }

    /// Whether layers of this kind accept `set`/`reset` mutations.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::Oem)
    }

    /// File stem used when persisting a writable layer.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Oem => "oem",
            Self::User => "user",
            Self::Runtime => "runtime",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

/// One source of override values for a scope.
///
/// Entries are mutable only through [`LayerSet::apply`] and
/// [`LayerSet::remove`]; the engine facade enforces key permissions before
/// either is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideLayer {
    pub scope: Scope,
    pub kind: SourceKind,
    pub priority: i32,
    pub entries: BTreeMap<String, Value>,
}

impl OverrideLayer {
    /// Create an empty layer.
    pub fn new(scope: Scope, kind: SourceKind, priority: i32) -> Self {
        Self {
            scope,
            kind,
            priority,
            entries: BTreeMap::new(),
        }
    }

    /// The value this layer holds for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
}

/// All override layers for one scope.
///
/// Holds at most one `User` and one `Runtime` layer, and any number of
/// `Oem` layers (one per vendor override file). Writable layers are created
/// lazily on the first `apply` for their kind.
#[derive(Debug, Default)]
pub struct LayerSet {
    oem: Vec<OverrideLayer>,
    user: Option<OverrideLayer>,
    runtime: Option<OverrideLayer>,
}

/// Priority assigned to writable layers.
///
/// Vendor override files default to the same priority, so the kind rank
/// decides and `runtime > user > oem` holds unless a vendor file pins a
/// higher priority explicitly.
pub const WRITABLE_PRIORITY: i32 = 0;

impl LayerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the vendor layers loaded from override files.
    pub fn set_oem_layers(&mut self, mut layers: Vec<OverrideLayer>) {
        layers.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.oem = layers;
    }

    /// Install a previously persisted writable layer.
    pub fn set_writable_layer(&mut self, layer: OverrideLayer) {
        debug_assert!(layer.kind.is_writable());
        match layer.kind {
            SourceKind::User => self.user = Some(layer),
            SourceKind::Runtime => self.runtime = Some(layer),
            SourceKind::Oem => {}
        }
    }

    /// All layers, vendor first, in no particular priority order.
    pub fn layers(&self) -> impl Iterator<Item = &OverrideLayer> {
        self.oem
            .iter()
            .chain(self.user.iter())
            .chain(self.runtime.iter())
    }

    /// The writable layer of `kind`, if it exists.
    pub fn writable(&self, kind: SourceKind) -> Option<&OverrideLayer> {
        match kind {
            SourceKind::User => self.user.as_ref(),
            SourceKind::Runtime => self.runtime.as_ref(),
            SourceKind::Oem => None,
        }
    }

    /// Record `key = value` in the writable layer of `kind`.
    ///
    /// Creates the layer on first use. Returns `false` when the layer
    /// already held exactly this value, so callers can suppress spurious
    /// change events (idempotence).
    pub fn apply(&mut self, scope: &Scope, kind: SourceKind, key: &str, value: Value) -> bool {
        debug_assert!(kind.is_writable());
        let slot = match kind {
            SourceKind::User => &mut self.user,
            SourceKind::Runtime => &mut self.runtime,
            SourceKind::Oem => return false,
        };
        let layer = slot
            .get_or_insert_with(|| OverrideLayer::new(scope.clone(), kind, WRITABLE_PRIORITY));
        if layer.entries.get(key) == Some(&value) {
            return false;
        }
        layer.entries.insert(key.to_string(), value);
        true
    }

    /// Remove `key` (or every entry, when `None`) from the writable layer
    /// of `kind`.
    ///
    /// Returns the keys that were actually removed; an empty result means
    /// the call was a no-op.
    pub fn remove(&mut self, kind: SourceKind, key: Option<&str>) -> Vec<String> {
        let slot = match kind {
            SourceKind::User => &mut self.user,
            SourceKind::Runtime => &mut self.runtime,
            SourceKind::Oem => return Vec::new(),
        };
        let Some(layer) = slot.as_mut() else {
            return Vec::new();
        };
        match key {
            Some(key) => layer
                .entries
                .remove(key)
                .map(|_| vec![key.to_string()])
                .unwrap_or_default(),
            None => std::mem::take(&mut layer.entries).into_keys().collect(),
        }
    }

    /// Keys defined by at least one layer.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut keys: Vec<&str> = self
            .layers()
            .flat_map(|layer| layer.entries.keys().map(String::as_str))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn scope() -> Scope {
        Scope::new(1000, "app", "res", "")
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut set = LayerSet::new();
        assert!(set.apply(&scope(), SourceKind::Runtime, "k", json!(1)));
        assert!(!set.apply(&scope(), SourceKind::Runtime, "k", json!(1)));
        assert!(set.apply(&scope(), SourceKind::Runtime, "k", json!(2)));
    }

    #[test]
    fn test_remove_single_key() {
        let mut set = LayerSet::new();
        set.apply(&scope(), SourceKind::Runtime, "a", json!(1));
        set.apply(&scope(), SourceKind::Runtime, "b", json!(2));

        assert_eq!(set.remove(SourceKind::Runtime, Some("a")), vec!["a"]);
        // removing again is a no-op
        assert!(set.remove(SourceKind::Runtime, Some("a")).is_empty());
        assert_eq!(
            set.writable(SourceKind::Runtime).unwrap().get("b"),
            Some(&json!(2))
        );
    }

    #[test]
    fn test_remove_all_returns_every_key() {
        let mut set = LayerSet::new();
        set.apply(&scope(), SourceKind::User, "a", json!(1));
        set.apply(&scope(), SourceKind::User, "b", json!(2));

        let mut removed = set.remove(SourceKind::User, None);
        removed.sort();
        assert_eq!(removed, vec!["a", "b"]);
        assert!(set.remove(SourceKind::User, None).is_empty());
    }

    #[test]
    fn test_oem_layers_sorted_by_priority() {
        let mut set = LayerSet::new();
        let mut low = OverrideLayer::new(scope(), SourceKind::Oem, 1);
        low.entries.insert("k".into(), json!("low"));
        let mut high = OverrideLayer::new(scope(), SourceKind::Oem, 5);
        high.entries.insert("k".into(), json!("high"));
        set.set_oem_layers(vec![low, high]);

        let priorities: Vec<i32> = set.layers().map(|l| l.priority).collect();
        assert_eq!(priorities, vec![5, 1]);
    }

    #[test]
    fn test_source_kind_rank_order() {
        assert!(SourceKind::Runtime.rank() > SourceKind::User.rank());
        assert!(SourceKind::User.rank() > SourceKind::Oem.rank());
        assert!(!SourceKind::Oem.is_writable());
    }

    #[test]
    fn test_keys_deduplicated_across_layers() {
        let mut set = LayerSet::new();
        set.apply(&scope(), SourceKind::User, "a", json!(1));
        set.apply(&scope(), SourceKind::Runtime, "a", json!(2));
        set.apply(&scope(), SourceKind::Runtime, "b", json!(3));

        let keys: Vec<&str> = set.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
