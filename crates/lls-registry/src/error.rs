use std::io;
use std::path::PathBuf;
use std::time::Duration;

use lls_fs::FsError;

/// Errors from path registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No entry exists for the key.
    #[error("key not found in registry: {key}")]
    NotFound { key: String },

    /// The backing store holds a malformed entry set for the key.
    #[error("registry inconsistent for {key}: {reason}")]
    Inconsistent { key: String, reason: String },

    /// The key cannot be held by the registry.
    #[error("invalid registry key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Paths are persisted as text and must be valid UTF-8.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// Filesystem traversal during rebuild or audit could not proceed.
    #[error("store walk failed: {0}")]
    Walk(#[from] FsError),

    /// The temporary file backing a key enumeration failed.
    #[error("key spill failed: {0}")]
    Spill(#[source] io::Error),

    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sqlite {op} failed: {source}")]
    Sqlite {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The pool could not open its initial connections.
    #[error("cannot open connection pool for {}: {source}", path.display())]
    PoolOpen {
        path: PathBuf,
        #[source]
        source: r2d2::Error,
    },

    /// No pooled connection became free within the acquire timeout.
    #[error("connection pool exhausted after waiting {timeout:?}: {source}")]
    PoolExhausted {
        timeout: Duration,
        #[source]
        source: r2d2::Error,
    },

    #[error("invalid table name {0:?}")]
    InvalidTable(String),
}

impl RegistryError {
    pub(crate) fn sqlite(op: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Sqlite { op, source }
    }
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
