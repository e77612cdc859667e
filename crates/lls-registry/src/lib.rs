//! Path registry for the low-level storage engine.
//!
//! The registry maps every stored key to the file path chosen for it when it
//! was added. It is the single source of truth for whether a key exists: a
//! file on disk with no registry entry is not stored, as far as the engine
//! is concerned.
//!
//! # Backends
//!
//! All backends implement the [`PathRegistry`] trait:
//!
//! - [`InMemoryPathRegistry`] -- `HashMap` behind a `RwLock`, rebuilt from
//!   files at start-up
//! - [`SqlitePathRegistry`] -- one SQLite table per store, shared
//!   [`SqlitePool`]
//!
//! # Recovery
//!
//! - [`PathRegistry::rebuild`] throws the index away and re-derives it from a
//!   walk of the store bases. It is not atomic and must only run while the
//!   store is otherwise idle.
//! - [`PathRegistry::audit_files`] and [`PathRegistry::audit_registry`]
//!   compare the two sides in either direction and report, never repair.

pub mod error;
pub mod keys;
pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;
pub mod walk;

pub use error::{RegistryError, RegistryResult};
pub use keys::{KeyIter, KeySpill};
pub use memory::InMemoryPathRegistry;
pub use sqlite::{PathEscape, PoolConfig, SqlitePathRegistry, SqlitePool};
pub use traits::PathRegistry;
pub use types::{AuditFinding, AuditReport, Lookup, RebuildReport, RegistryContext};
