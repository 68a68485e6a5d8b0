//! Atomic persistence of writable layers and vendor override loading
//!
//! Writable (`user`/`runtime`) layers live under a state root:
//!
//! ```text
//! <state>/<uid>/<appid>/<resource>[/<subpath>]/user.json
//! <state>/<uid>/<appid>/<resource>[/<subpath>]/runtime.json
//! ```
//!
//! each holding `{"contents": {key: value}}`. Vendor override files live
//! next to the schema (see `conf_meta::registry::OVERRIDES_DIR`) and carry
//! an explicit priority: `{"priority": 10, "contents": {key: value}}`.
//!
//! Writes use the write-to-temp-then-rename strategy with an advisory lock
//! so a crash mid-write never leaves a partial layer file behind.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use conf_meta::Scope;

use crate::layer::{OverrideLayer, SourceKind, WRITABLE_PRIORITY};
use crate::{Error, Result};

/// On-disk body of a layer file.
#[derive(Debug, Serialize, Deserialize)]
struct LayerFile {
    #[serde(default)]
    priority: i32,
    contents: BTreeMap<String, Value>,
}

/// Write `content` atomically to `path` with an advisory lock.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory, so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::Lock {
            path: path.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::Lock {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Path of the persisted file for a writable layer.
pub fn layer_path(state_root: &Path, scope: &Scope, kind: SourceKind) -> PathBuf {
    let mut path = state_root
        .join(scope.uid.to_string())
        .join(scope.app_dir())
        .join(&scope.resource);
    if !scope.subpath.is_empty() {
        path = path.join(&scope.subpath);
    }
    path.join(format!("{}.json", kind.file_stem()))
}

/// Persist a writable layer.
///
/// An empty layer deletes its file instead of writing `{}` — a fully reset
/// scope leaves no state behind.
pub fn save_writable_layer(state_root: &Path, layer: &OverrideLayer) -> Result<()> {
    let path = layer_path(state_root, &layer.scope, layer.kind);

    if layer.entries.is_empty() {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&path, e)),
        }
        tracing::debug!(?path, scope = %layer.scope, "removed empty layer file");
        return Ok(());
    }

    let body = LayerFile {
        priority: layer.priority,
        contents: layer.entries.clone(),
    };
    let text = serde_json::to_vec_pretty(&body).map_err(|source| Error::Parse {
        path: path.clone(),
        source,
    })?;
    write_atomic(&path, &text)?;
    tracing::debug!(?path, scope = %layer.scope, kind = %layer.kind, "persisted layer");
    Ok(())
}

/// Load the persisted writable layers for a scope, if any exist.
pub fn load_writable_layers(state_root: &Path, scope: &Scope) -> Result<Vec<OverrideLayer>> {
    let mut layers = Vec::new();
    for kind in [SourceKind::User, SourceKind::Runtime] {
        let path = layer_path(state_root, scope, kind);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(Error::io(&path, e)),
        };
        let body: LayerFile = serde_json::from_str(&text).map_err(|source| Error::Parse {
            path: path.clone(),
            source,
        })?;
        layers.push(OverrideLayer {
            scope: scope.clone(),
            kind,
            priority: WRITABLE_PRIORITY,
            entries: body.contents,
        });
    }
    Ok(layers)
}

/// Load vendor override layers from the given override directories.
///
/// Files are read in name order per directory. A malformed file is skipped
/// with a warning so one bad vendor file cannot take down the whole scope.
pub fn load_oem_layers(dirs: &[PathBuf], scope: &Scope) -> Vec<OverrideLayer> {
    let mut layers = Vec::new();
    for dir in dirs {
        let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
                .collect(),
            Err(e) => {
                tracing::warn!(?dir, error = %e, "failed to scan override directory");
                continue;
            }
        };
        files.sort();

        for path in files {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(?path, error = %e, "failed to read override file");
                    continue;
                }
            };
            match serde_json::from_str::<LayerFile>(&text) {
                Ok(body) => layers.push(OverrideLayer {
                    scope: scope.clone(),
                    kind: SourceKind::Oem,
                    priority: body.priority,
                    entries: body.contents,
                }),
                Err(e) => {
                    tracing::warn!(?path, error = %e, "skipping malformed override file");
                }
            }
        }
    }
    layers
}
