//! Test fixtures for config-center
//!
//! [`TestRoot`] builds a temporary schema/state directory tree and hands
//! out matching [`EnginePaths`], so engine and CLI tests can set up
//! realistic installs in a couple of lines.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use conf_core::EnginePaths;

/// A temporary configuration install with helper methods for test setup.
///
/// # Example
///
/// ```rust,no_run
/// use conf_test_utils::TestRoot;
/// use serde_json::json;
///
/// let root = TestRoot::new();
/// root.write_schema("app", "", "res", &TestRoot::schema(&[("export", json!(false))]));
/// let engine = conf_core::ConfigEngine::new(root.paths());
/// ```
pub struct TestRoot {
    temp: TempDir,
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRoot {
    /// Create an empty temporary install.
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("TestRoot: failed to create temp dir"),
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Engine paths over this install: schemas under `apps/`, writable
    /// state under `state/`.
    pub fn paths(&self) -> EnginePaths {
        EnginePaths::new(vec![self.schema_root()], self.state_root())
    }

    /// The schema install root.
    pub fn schema_root(&self) -> PathBuf {
        self.root().join("apps")
    }

    /// The writable-layer state root.
    pub fn state_root(&self) -> PathBuf {
        self.root().join("state")
    }

    /// Render a minimal schema body with the given keys and defaults.
    pub fn schema(keys: &[(&str, Value)]) -> String {
        let contents: serde_json::Map<String, Value> = keys
            .iter()
            .map(|(key, default)| {
                (
                    key.to_string(),
                    serde_json::json!({ "value": default.clone() }),
                )
            })
            .collect();
        serde_json::json!({
            "magic": "dsg.config.meta",
            "version": "1.0",
            "contents": contents,
        })
        .to_string()
    }

    /// Install a schema file for `(appid, subpath, resource)`.
    pub fn write_schema(&self, appid: &str, subpath: &str, resource: &str, body: &str) {
        let mut dir = self.schema_root().join(app_dir(appid)).join("configs");
        if !subpath.is_empty() {
            dir = dir.join(subpath);
        }
        fs::create_dir_all(&dir).expect("TestRoot: failed to create schema dir");
        fs::write(dir.join(format!("{resource}.json")), body)
            .expect("TestRoot: failed to write schema");
    }

    /// Install a vendor override file with an explicit priority.
    pub fn write_oem_override(
        &self,
        appid: &str,
        subpath: &str,
        resource: &str,
        file_name: &str,
        priority: i32,
        entries: Value,
    ) {
        let mut dir = self
            .schema_root()
            .join(app_dir(appid))
            .join("configs")
            .join("overrides");
        if !subpath.is_empty() {
            dir = dir.join(subpath);
        }
        dir = dir.join(resource);
        fs::create_dir_all(&dir).expect("TestRoot: failed to create overrides dir");
        let body = serde_json::json!({ "priority": priority, "contents": entries });
        fs::write(dir.join(file_name), body.to_string())
            .expect("TestRoot: failed to write override");
    }

    /// Path of a persisted writable-layer file.
    pub fn layer_file(&self, uid: u32, appid: &str, resource: &str, kind: &str) -> PathBuf {
        self.state_root()
            .join(uid.to_string())
            .join(app_dir(appid))
            .join(resource)
            .join(format!("{kind}.json"))
    }

    /// Assert a file exists under the root.
    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.root().join(relative).is_file(),
            "expected file to exist: {relative}"
        );
    }
}

fn app_dir(appid: &str) -> &str {
    if appid.is_empty() { "_generic" } else { appid }
}
