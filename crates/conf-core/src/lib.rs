//! Core engine for config-center
//!
//! This crate coordinates the layer-0 crates into the configuration
//! engine:
//!
//! - **Resolver**: pure, priority-ordered merge of schema defaults and
//!   override layers into one effective value with provenance
//! - **Notification hub**: per-scope broadcast of change events to
//!   cancellable watcher subscriptions
//! - **[`ConfigEngine`]**: the facade exposing `get`, `set`, `reset`,
//!   `list`, `watch`, `export`, `reload` and `flush` under a per-scope
//!   concurrency discipline
//!
//! # Architecture
//!
//! ```text
//!            CLI / front ends
//!                   |
//!               conf-core
//!                   |
//!           +-------+-------+
//!           |               |
//!       conf-meta       conf-store
//! ```
//!
//! Scopes are the unit of mutual exclusion: mutations on one scope are
//! serialized, operations on unrelated scopes never contend.

pub mod engine;
pub mod error;
pub mod export;
pub mod hub;
pub mod paths;
pub mod resolver;

pub use engine::{ConfigEngine, MetaField};
pub use error::{Error, Result};
pub use export::{ExportRow, ListFilter};
pub use hub::{ChangeEvent, NotificationHub, Subscription};
pub use paths::EnginePaths;
pub use resolver::{Provenance, ResolvedValue, resolve};

pub use conf_meta::{KeyMeta, Permission, Schema, Scope, ValueType, Visibility};
pub use conf_store::SourceKind;
