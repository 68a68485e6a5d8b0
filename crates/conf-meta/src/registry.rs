//! Schema install-root scanning and loading
//!
//! Schemas are installed under one or more roots with the layout:
//!
//! ```text
//! <root>/
//!   <appid>/
//!     configs/
//!       <resource>.json            base install
//!       <subpath>/<resource>.json  secondary install
//!       overrides/...              vendor override files (not schemas)
//!   _generic/
//!     configs/...                  application-independent configuration
//! ```
//!
//! The registry scans every root in order; the first root that provides a
//! schema file wins. Discovery results are deduplicated across roots and
//! sorted so repeated queries are byte-identical.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::Schema;
use crate::scope::{GENERIC_APP_DIR, Scope};
use crate::{Error, Result};

/// Directory under `configs/` holding vendor override files.
pub const OVERRIDES_DIR: &str = "overrides";

/// File extension of schema and override files.
pub const SCHEMA_SUFFIX: &str = "json";

/// Locates and loads configuration descriptions from install roots.
pub struct SchemaRegistry {
    roots: Vec<PathBuf>,
}

impl SchemaRegistry {
    /// Create a registry scanning `roots` in order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// The install roots this registry scans.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Path of the schema file for a scope, if any root provides one.
    pub fn schema_path(&self, scope: &Scope) -> Option<PathBuf> {
        for root in &self.roots {
            let mut path = root.join(scope.app_dir()).join("configs");
            if !scope.subpath.is_empty() {
                path = path.join(&scope.subpath);
            }
            path = path.join(format!("{}.{}", scope.resource, SCHEMA_SUFFIX));
            if path.is_file() {
                return Some(path);
            }
        }
        None
    }

    /// Load the schema for a scope.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaNotFound`] when no root provides a schema file for
    /// the coordinates; read and parse failures are propagated.
    pub fn load(&self, scope: &Scope) -> Result<Schema> {
        let path = self.schema_path(scope).ok_or_else(|| Error::SchemaNotFound {
            appid: scope.appid.clone(),
            resource: scope.resource.clone(),
            subpath: scope.subpath.clone(),
        })?;

        tracing::debug!(?path, %scope, "loading schema");
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Schema::parse(&path, &text)
    }

    /// Directories holding vendor override files for a scope, in root order.
    ///
    /// Layout: `<root>/<appid>/configs/overrides[/<subpath>]/<resource>/`.
    /// Only directories that exist are returned.
    pub fn override_dirs(&self, scope: &Scope) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for root in &self.roots {
            let mut path = root.join(scope.app_dir()).join("configs").join(OVERRIDES_DIR);
            if !scope.subpath.is_empty() {
                path = path.join(&scope.subpath);
            }
            path = path.join(&scope.resource);
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs
    }

    /// All application directories that have configuration installed,
    /// sorted. Application-independent configuration appears under its
    /// [`GENERIC_APP_DIR`] name.
    pub fn applications(&self) -> Vec<String> {
        let mut apps = BTreeSet::new();
        for root in &self.roots {
            let entries = match fs::read_dir(root) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.join("configs").is_dir() {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        apps.insert(name.to_string());
                    }
                }
            }
        }
        apps.into_iter().collect()
    }

    /// All resource names installed for `appid` (base installs only), sorted.
    pub fn resources_for_app(&self, appid: &str) -> Vec<String> {
        let app_dir = if appid.is_empty() { GENERIC_APP_DIR } else { appid };
        let mut resources = BTreeSet::new();
        for root in &self.roots {
            let configs = root.join(app_dir).join("configs");
            let entries = match fs::read_dir(&configs) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|e| e == SCHEMA_SUFFIX) {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        resources.insert(stem.to_string());
                    }
                }
            }
        }
        resources.into_iter().collect()
    }

    /// All secondary install subpaths providing `resource` for `appid`, sorted.
    pub fn subpaths_for_resource(&self, appid: &str, resource: &str) -> Vec<String> {
        let app_dir = if appid.is_empty() { GENERIC_APP_DIR } else { appid };
        let file_name = format!("{}.{}", resource, SCHEMA_SUFFIX);
        let mut subpaths = BTreeSet::new();
        for root in &self.roots {
            let configs = root.join(app_dir).join("configs");
            collect_subpaths(&configs, &configs, &file_name, &mut subpaths);
        }
        subpaths.into_iter().collect()
    }

    /// Whether any root installs `resource` for `appid` (base or subpath).
    pub fn resource_exists(&self, appid: &str, resource: &str) -> bool {
        self.resources_for_app(appid).iter().any(|r| r == resource)
            || !self.subpaths_for_resource(appid, resource).is_empty()
    }
}

/// Recursively collect subdirectories of `configs` that contain `file_name`.
fn collect_subpaths(configs: &Path, dir: &Path, file_name: &str, out: &mut BTreeSet<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if path.file_name().is_some_and(|n| n == OVERRIDES_DIR) {
            continue;
        }
        if path.join(file_name).is_file() {
            if let Ok(rel) = path.strip_prefix(configs) {
                out.insert(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        collect_subpaths(configs, &path, file_name, out);
    }
}
