//! Override layer store, value cache and persistence for config-center
//!
//! This crate owns the mutable side of the configuration model:
//!
//! - [`OverrideLayer`] / [`LayerSet`]: the tagged override records for one
//!   scope and the idempotent apply/remove operations over them
//! - [`ValueCache`]: a size-bounded memoization cache for resolved values,
//!   never the source of truth
//! - [`persist`]: atomic JSON persistence of writable layers and loading of
//!   vendor (OEM) override files
//!
//! Layers are only ever mutated through the engine facade in `conf-core`,
//! which also enforces write permissions before calling into this crate.

pub mod cache;
pub mod error;
pub mod layer;
pub mod persist;

pub use cache::ValueCache;
pub use error::{Error, Result};
pub use layer::{LayerSet, OverrideLayer, SourceKind};
