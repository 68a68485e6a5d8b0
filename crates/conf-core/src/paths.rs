//! Engine filesystem layout
//!
//! The engine owns no ambient global state: every instance is constructed
//! from an explicit [`EnginePaths`], with platform defaults provided by
//! [`EnginePaths::discover`]. A working-prefix constructor supports the
//! CLI's `-p` option and hermetic tests.

use std::path::{Path, PathBuf};

/// System-wide schema install root.
const SYSTEM_SCHEMA_ROOT: &str = "/usr/share/config-center/apps";

/// Where the engine reads schemas and writes override state.
#[derive(Debug, Clone)]
pub struct EnginePaths {
    /// Schema install roots, scanned in order; first hit wins
    pub schema_roots: Vec<PathBuf>,
    /// Root for persisted writable layers
    pub state_root: PathBuf,
}

impl EnginePaths {
    /// Explicit roots, for embedders and tests.
    pub fn new(schema_roots: Vec<PathBuf>, state_root: PathBuf) -> Self {
        Self {
            schema_roots,
            state_root,
        }
    }

    /// Platform defaults: the per-user data dir ahead of the system root,
    /// state under the per-user state dir.
    pub fn discover() -> Self {
        let mut schema_roots = Vec::new();
        if let Some(data) = dirs::data_dir() {
            schema_roots.push(data.join("config-center").join("apps"));
        }
        schema_roots.push(PathBuf::from(SYSTEM_SCHEMA_ROOT));

        let state_root = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("/var/lib"))
            .join("config-center");

        Self {
            schema_roots,
            state_root,
        }
    }

    /// All paths re-rooted under `prefix` (the CLI's working-prefix option).
    pub fn under_prefix(prefix: &Path) -> Self {
        Self {
            schema_roots: vec![prefix.join("usr/share/config-center/apps")],
            state_root: prefix.join("var/lib/config-center"),
        }
    }
}
