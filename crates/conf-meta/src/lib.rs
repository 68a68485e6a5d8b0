//! Schema source for config-center
//!
//! This crate owns the read-only side of the configuration model:
//!
//! - **Schema files**: JSON configuration descriptions mapping keys to their
//!   default value, display name, description, permission and visibility
//! - **[`Scope`]**: the `(uid, appid, resource, subpath)` coordinate every
//!   engine operation is parameterized by
//! - **[`SchemaRegistry`]**: loads schema files from one or more install
//!   roots and answers discovery queries (applications, resources, subpaths)
//!
//! Schemas are immutable once loaded. Everything mutable (override layers,
//! caches) lives in the crates layered above this one.

pub mod error;
pub mod registry;
pub mod schema;
pub mod scope;

pub use error::{Error, Result};
pub use registry::SchemaRegistry;
pub use schema::{KeyMeta, Permission, Schema, ValueType, Visibility};
pub use scope::Scope;
