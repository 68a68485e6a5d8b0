//! Engine facade: operation contracts and per-scope concurrency
//!
//! [`ConfigEngine`] coordinates the schema registry, override layer
//! store, value cache and notification hub under one discipline: each
//! scope owns its state behind its own lock, mutations on a scope are
//! serialized, and operations on unrelated scopes proceed in parallel.
//! The engine-wide scope map lock is held only to look up or insert a
//! scope entry, never across another scope's operation.
//!
//! Mutations commit in a fixed order: validate, persist, update layers,
//! invalidate cache, publish. A persistence failure aborts before
//! anything becomes observable; a notification is published only when
//! the effective value actually changed.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use conf_meta::{Permission, Schema, SchemaRegistry, Scope, ValueType};
use conf_store::layer::WRITABLE_PRIORITY;
use conf_store::{persist, LayerSet, OverrideLayer, SourceKind, ValueCache};

use crate::export::{ExportRow, ListFilter};
use crate::hub::{ChangeEvent, NotificationHub, Subscription};
use crate::paths::EnginePaths;
use crate::resolver::{resolve, ResolvedValue};
use crate::{Error, Result};

/// Metadata field selectable by `get` with a method argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Name,
    Description,
    Visibility,
    Permissions,
    Version,
    IsDefault,
}

impl MetaField {
    /// Parse a CLI method name. Accepts both the hyphenated spelling and
    /// the legacy camel-case `isDefaultValue`.
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "visibility" => Some(Self::Visibility),
            "permissions" => Some(Self::Permissions),
            "version" => Some(Self::Version),
            "is-default" | "isDefaultValue" => Some(Self::IsDefault),
            _ => None,
        }
    }

    /// All method names, for CLI help output.
    pub fn names() -> &'static [&'static str] {
        &[
            "value",
            "name",
            "description",
            "visibility",
            "permissions",
            "version",
            "is-default",
        ]
    }
}

/// Schema and layers for one scope, guarded together so a read observes
/// one consistent merge input.
struct ScopeData {
    schema: Schema,
    layers: LayerSet,
}

/// Per-scope state: the lock is the scope's unit of mutual exclusion.
struct ScopeState {
    data: RwLock<ScopeData>,
    cache: ValueCache<ResolvedValue>,
}

/// The configuration engine facade.
///
/// Construct one per process with explicit [`EnginePaths`]; scopes are
/// loaded lazily on first touch (schema, vendor override files, persisted
/// writable layers) and kept until process teardown. [`ConfigEngine::flush`]
/// persists all loaded writable layers.
pub struct ConfigEngine {
    registry: SchemaRegistry,
    state_root: PathBuf,
    scopes: RwLock<HashMap<Scope, Arc<ScopeState>>>,
    hub: NotificationHub,
}

impl ConfigEngine {
    /// Create an engine over the given filesystem layout.
    pub fn new(paths: EnginePaths) -> Self {
        tracing::info!(
            schema_roots = ?paths.schema_roots,
            state_root = ?paths.state_root,
            "config engine created"
        );
        Self {
            registry: SchemaRegistry::new(paths.schema_roots),
            state_root: paths.state_root,
            scopes: RwLock::new(HashMap::new()),
            hub: NotificationHub::new(),
        }
    }

    /// The schema registry, for discovery queries.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Resolve the effective value of `key` within `scope`.
    pub fn get(&self, scope: &Scope, key: &str) -> Result<ResolvedValue> {
        let state = self.scope_state(scope)?;
        if let Some(hit) = state.cache.get(key) {
            return Ok(hit);
        }
        let data = state.data.read();
        let resolved = resolve(scope, &data.schema, &data.layers, key)?;
        // populate under the read lock: a concurrent mutation invalidates
        // under the write lock, so it cannot interleave with this put
        state.cache.put(key, resolved.clone());
        Ok(resolved)
    }

    /// Look up a metadata field instead of the value.
    pub fn get_meta(&self, scope: &Scope, key: &str, field: MetaField) -> Result<String> {
        let state = self.scope_state(scope)?;
        let data = state.data.read();
        let meta = data
            .schema
            .key(key)
            .ok_or_else(|| Error::key_not_found(scope, key))?;
        Ok(match field {
            MetaField::Name => meta.name.clone(),
            MetaField::Description => meta.description.clone(),
            MetaField::Visibility => meta.visibility.to_string(),
            MetaField::Permissions => meta.permission.to_string(),
            MetaField::Version => data.schema.version().to_string(),
            MetaField::IsDefault => resolve(scope, &data.schema, &data.layers, key)?
                .is_default
                .to_string(),
        })
    }

    /// All keys the scope's schema defines, in lexicographic order.
    pub fn keys(&self, scope: &Scope) -> Result<Vec<String>> {
        let state = self.scope_state(scope)?;
        let data = state.data.read();
        Ok(data.schema.key_list().map(|(k, _)| k.to_string()).collect())
    }

    /// Record `key = value` as a runtime override.
    ///
    /// Returns whether the effective value changed (and a notification was
    /// published). The write is persisted before it commits; a storage
    /// failure leaves no observable effect.
    pub fn set(&self, scope: &Scope, key: &str, value: Value) -> Result<bool> {
        let state = self.scope_state(scope)?;
        let mut data = state.data.write();

        let (permission, value_type) = {
            let meta = data
                .schema
                .key(key)
                .ok_or_else(|| Error::key_not_found(scope, key))?;
            (meta.permission, meta.value_type)
        };
        if permission == Permission::ReadOnly {
            return Err(Error::PermissionDenied {
                key: key.to_string(),
            });
        }
        if !value_type.accepts(&value) {
            return Err(Error::TypeMismatch {
                key: key.to_string(),
                expected: value_type,
                actual: ValueType::of(&value),
            });
        }

        // idempotent: the runtime layer already holds exactly this value
        if data
            .layers
            .writable(SourceKind::Runtime)
            .and_then(|l| l.get(key))
            == Some(&value)
        {
            return Ok(false);
        }

        let old = resolve(scope, &data.schema, &data.layers, key)?;

        let mut prospective = data
            .layers
            .writable(SourceKind::Runtime)
            .cloned()
            .unwrap_or_else(|| {
                OverrideLayer::new(scope.clone(), SourceKind::Runtime, WRITABLE_PRIORITY)
            });
        prospective.entries.insert(key.to_string(), value.clone());
        persist::save_writable_layer(&self.state_root, &prospective)?;

        data.layers.apply(scope, SourceKind::Runtime, key, value);
        state.cache.invalidate(key);

        let new = resolve(scope, &data.schema, &data.layers, key)?;
        let changed = new.value != old.value;
        if changed {
            tracing::debug!(%scope, key, "value changed by set");
            self.hub.publish(ChangeEvent {
                scope: scope.clone(),
                key: key.to_string(),
                value: new,
            });
        }
        Ok(changed)
    }

    /// Revert overrides to defaults.
    ///
    /// With a key, removes that key from the writable layers; without,
    /// clears them entirely. Vendor (OEM) customization survives — the
    /// post-reset value is the vendor value when one exists, else the
    /// schema default. Returns the keys whose effective value changed.
    /// Resetting an already-default state is a no-op with no notification.
    pub fn reset(&self, scope: &Scope, key: Option<&str>) -> Result<Vec<String>> {
        let state = self.scope_state(scope)?;
        let mut data = state.data.write();

        if let Some(key) = key {
            let meta = data
                .schema
                .key(key)
                .ok_or_else(|| Error::key_not_found(scope, key))?;
            if meta.permission == Permission::ReadOnly {
                return Err(Error::PermissionDenied {
                    key: key.to_string(),
                });
            }
        }

        let candidates: Vec<String> = match key {
            Some(key) => vec![key.to_string()],
            None => {
                let mut keys = BTreeSet::new();
                for kind in [SourceKind::User, SourceKind::Runtime] {
                    if let Some(layer) = data.layers.writable(kind) {
                        keys.extend(layer.entries.keys().cloned());
                    }
                }
                keys.into_iter().collect()
            }
        };

        // old effective values; entries for keys the schema dropped are
        // removed without an event
        let mut old_values: HashMap<String, ResolvedValue> = HashMap::new();
        for k in &candidates {
            if let Ok(v) = resolve(scope, &data.schema, &data.layers, k) {
                old_values.insert(k.clone(), v);
            }
        }

        // persist prospective layers first; commit only after every write
        // landed
        let mut dirty = Vec::new();
        for kind in [SourceKind::User, SourceKind::Runtime] {
            if let Some(layer) = data.layers.writable(kind) {
                let mut prospective = layer.clone();
                let before = prospective.entries.len();
                match key {
                    Some(k) => {
                        prospective.entries.remove(k);
                    }
                    None => prospective.entries.clear(),
                }
                if prospective.entries.len() != before {
                    dirty.push(prospective);
                }
            }
        }
        if dirty.is_empty() {
            return Ok(Vec::new());
        }
        for layer in &dirty {
            persist::save_writable_layer(&self.state_root, layer)?;
        }

        for kind in [SourceKind::User, SourceKind::Runtime] {
            data.layers.remove(kind, key);
        }
        match key {
            Some(k) => state.cache.invalidate(k),
            None => state.cache.invalidate_all(),
        }

        let mut changed = Vec::new();
        for k in candidates {
            let Some(old) = old_values.get(&k) else {
                continue;
            };
            let Ok(new) = resolve(scope, &data.schema, &data.layers, &k) else {
                continue;
            };
            if new.value != old.value {
                self.hub.publish(ChangeEvent {
                    scope: scope.clone(),
                    key: k.clone(),
                    value: new,
                });
                changed.push(k);
            }
        }
        tracing::debug!(%scope, ?changed, "reset committed");
        Ok(changed)
    }

    /// Enumerate effective values for every scope matching the filter.
    ///
    /// Rows are ordered lexicographically by `(appid, resource, subpath,
    /// key)`; repeated calls with unchanged state are byte-identical.
    pub fn list(&self, uid: u32, filter: &ListFilter) -> Result<Vec<ExportRow>> {
        let appids = match &filter.appid {
            Some(appid) => vec![appid.clone()],
            None => self.registry.applications(),
        };

        let mut rows = Vec::new();
        for appid in appids {
            let resources = match &filter.resource {
                Some(resource) => vec![resource.clone()],
                None => self.registry.resources_for_app(&appid),
            };
            for resource in resources {
                let subpaths = match &filter.subpath {
                    Some(subpath) => vec![subpath.clone()],
                    None => {
                        let mut subpaths = vec![String::new()];
                        subpaths.extend(self.registry.subpaths_for_resource(&appid, &resource));
                        subpaths
                    }
                };
                for subpath in subpaths {
                    let scope = Scope::new(uid, appid.clone(), resource.clone(), subpath.clone());
                    let state = match self.scope_state(&scope) {
                        Ok(state) => state,
                        Err(Error::NotFound { .. }) => continue,
                        Err(e) => return Err(e),
                    };
                    let data = state.data.read();
                    for (key, _) in data.schema.key_list() {
                        let resolved = resolve(&scope, &data.schema, &data.layers, key)?;
                        rows.push(ExportRow {
                            appid: appid.clone(),
                            resource: resource.clone(),
                            subpath: subpath.clone(),
                            key: key.to_string(),
                            value: resolved.value,
                            is_default: resolved.is_default,
                        });
                    }
                }
            }
        }
        Ok(rows)
    }

    /// Export surface: same rows and ordering as [`ConfigEngine::list`].
    pub fn export_rows(&self, uid: u32, filter: &ListFilter) -> Result<Vec<ExportRow>> {
        self.list(uid, filter)
    }

    /// Register a watcher for `scope`.
    ///
    /// The scope must exist; the optional key filter is a regular
    /// expression. The subscription only sees changes committed after it
    /// was created, and is cancelled by dropping it.
    pub fn watch(&self, scope: &Scope, key_filter: Option<&str>) -> Result<Subscription> {
        self.scope_state(scope)?;
        self.hub.subscribe(scope, key_filter)
    }

    /// Re-read schema and vendor override files for every loaded scope of
    /// `(appid, resource, subpath)`.
    ///
    /// Stray writable entries for keys the new schema dropped, or whose
    /// permission tightened to readonly, are removed. Watchers receive one
    /// event per key whose effective value changed. Returns the changed
    /// keys across all affected scopes.
    pub fn reload(&self, appid: &str, resource: &str, subpath: &str) -> Result<Vec<String>> {
        let loaded: Vec<(Scope, Arc<ScopeState>)> = {
            let scopes = self.scopes.read();
            scopes
                .iter()
                .filter(|(s, _)| {
                    s.appid == appid && s.resource == resource && s.subpath == subpath
                })
                .map(|(s, state)| (s.clone(), state.clone()))
                .collect()
        };

        let mut all_changed = Vec::new();
        for (scope, state) in loaded {
            tracing::info!(%scope, "reloading scope");
            let new_schema = self
                .registry
                .load(&scope)
                .map_err(|_| Error::scope_not_found(&scope))?;
            let new_oem =
                persist::load_oem_layers(&self.registry.override_dirs(&scope), &scope);

            let mut data = state.data.write();

            let keys: BTreeSet<String> = data
                .schema
                .key_list()
                .map(|(k, _)| k.to_string())
                .chain(new_schema.key_list().map(|(k, _)| k.to_string()))
                .collect();

            let mut old_values: HashMap<String, ResolvedValue> = HashMap::new();
            for key in &keys {
                if let Ok(v) = resolve(&scope, &data.schema, &data.layers, key) {
                    old_values.insert(key.clone(), v);
                }
            }

            // prune writable entries invalidated by the new schema
            let mut dirty = Vec::new();
            for kind in [SourceKind::User, SourceKind::Runtime] {
                if let Some(layer) = data.layers.writable(kind) {
                    let mut prospective = layer.clone();
                    prospective.entries.retain(|key, _| {
                        new_schema
                            .key(key)
                            .is_some_and(|m| m.permission == Permission::ReadWrite)
                    });
                    if prospective.entries.len() != layer.entries.len() {
                        dirty.push(prospective);
                    }
                }
            }
            for layer in &dirty {
                persist::save_writable_layer(&self.state_root, layer)?;
            }
            for layer in dirty {
                data.layers.set_writable_layer(layer);
            }

            data.schema = new_schema;
            data.layers.set_oem_layers(new_oem);
            state.cache.invalidate_all();

            for key in keys {
                let new = resolve(&scope, &data.schema, &data.layers, &key).ok();
                let old = old_values.get(&key);
                if new.as_ref().map(|v| &v.value) != old.map(|v| &v.value) {
                    if let Some(new) = new {
                        self.hub.publish(ChangeEvent {
                            scope: scope.clone(),
                            key: key.clone(),
                            value: new,
                        });
                    }
                    all_changed.push(key);
                }
            }
        }
        Ok(all_changed)
    }

    /// Persist every loaded writable layer.
    ///
    /// Mutations persist as they commit, so this is the teardown
    /// belt-and-braces pass, mirroring the `sync` maintenance operation.
    pub fn flush(&self) -> Result<()> {
        let scopes: Vec<Arc<ScopeState>> = self.scopes.read().values().cloned().collect();
        for state in scopes {
            let data = state.data.read();
            for kind in [SourceKind::User, SourceKind::Runtime] {
                if let Some(layer) = data.layers.writable(kind) {
                    persist::save_writable_layer(&self.state_root, layer)?;
                }
            }
        }
        Ok(())
    }

    /// Look up or lazily load the state for a scope.
    ///
    /// Schema files that are missing or fail to parse surface as
    /// [`Error::NotFound`] for the whole scope.
    fn scope_state(&self, scope: &Scope) -> Result<Arc<ScopeState>> {
        if let Some(state) = self.scopes.read().get(scope) {
            return Ok(state.clone());
        }

        // load outside the map lock; a concurrent loader may win the insert
        let schema = self.registry.load(scope).map_err(|e| {
            tracing::debug!(%scope, error = %e, "schema load failed");
            Error::scope_not_found(scope)
        })?;
        let mut layers = LayerSet::new();
        layers.set_oem_layers(persist::load_oem_layers(
            &self.registry.override_dirs(scope),
            scope,
        ));
        for layer in persist::load_writable_layers(&self.state_root, scope)? {
            layers.set_writable_layer(layer);
        }
        tracing::debug!(%scope, "scope loaded");

        let state = Arc::new(ScopeState {
            data: RwLock::new(ScopeData { schema, layers }),
            cache: ValueCache::new(),
        });
        let mut scopes = self.scopes.write();
        Ok(scopes.entry(scope.clone()).or_insert(state).clone())
    }
}
