use std::path::PathBuf;

use lls_types::TypeError;

/// Errors from path derivation and key encoding.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// The key cannot be mapped to a filesystem-safe name.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// A file name does not decode back to a key.
    #[error("cannot decode {name:?} to a key: {reason}")]
    Undecodable { name: String, reason: String },

    /// The path has no final component to decode.
    #[error("path {} has no file name", .0.display())]
    NoFileName(PathBuf),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for path operations.
pub type PathResult<T> = Result<T, PathError>;
