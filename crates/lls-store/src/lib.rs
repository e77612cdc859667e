//! Object and datastream stores for the low-level storage engine.
//!
//! A [`Store`] binds a path algorithm, a filesystem adapter and a path
//! registry for one namespace. [`LowLevelStorage`] opens the object store
//! and the datastream store from a single [`StorageConfig`].
//!
//! # Operations
//!
//! - `add` -- write a new payload and register its path
//! - `replace` -- overwrite an existing payload in place
//! - `retrieve` -- open the payload for reading
//! - `remove` -- unregister the key and delete the file
//! - `rebuild` / `audit` -- re-derive or check the registry from disk
//! - `list` -- stream every stored key
//!
//! # Design Rules
//!
//! 1. The registry alone decides whether a key exists.
//! 2. A payload's path is chosen once, at `add`, and never recomputed.
//! 3. Files are written before they are registered and unregistered before
//!    they are deleted, so a crash leaves at worst an orphan file.
//! 4. No locking: callers serialize operations on the same key, and rebuild
//!    runs only while the store is idle.

pub mod config;
pub mod error;
pub mod facade;
pub mod factory;
pub mod store;

pub use config::{DatabaseConfig, FileSystemKind, PathRegistryKind, StorageConfig};
pub use error::{ConfigError, StoreError, StoreResult};
pub use facade::LowLevelStorage;
pub use store::Store;

pub use lls_fs::{content_from, ContentStream};
pub use lls_path::PathAlgorithmKind;
pub use lls_registry::{AuditFinding, AuditReport, KeyIter, RebuildReport, SqlitePool};
pub use lls_types::{DatastreamKey, Namespace, Pid};
