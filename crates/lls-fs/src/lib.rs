//! Durable byte storage for the low-level storage engine.
//!
//! The [`FileSystem`] trait isolates the engine from a specific storage
//! medium. Stores only ever write new files, atomically rewrite existing
//! ones, read, delete, and (during rebuild and audit) traverse directories.
//!
//! - [`GenericFileSystem`] -- plain `std::fs` implementation
//!
//! Content is handed over as an owned [`ContentStream`]; every operation that
//! consumes one drops it before returning, on success and on failure alike.

pub mod error;
pub mod generic;
pub mod traits;

pub use error::{FsError, FsResult};
pub use generic::{GenericFileSystem, BACKUP_PREFIX};
pub use traits::{content_from, ContentStream, FileSystem};
