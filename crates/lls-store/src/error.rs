use std::io;
use std::path::PathBuf;

use lls_fs::FsError;
use lls_path::PathError;
use lls_registry::RegistryError;

/// Errors raised while loading or validating a [`StorageConfig`](crate::StorageConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required option was not supplied.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// An option was supplied but cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors from store and facade operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key is not in the store.
    #[error("not found: {key}")]
    NotFound { key: String },

    /// `add` was called for a key that is already stored.
    #[error("already exists: {key}")]
    AlreadyExists { key: String },

    /// The registry reported corrupt state for the key.
    #[error("registry inconsistent for {key}: {reason}")]
    Inconsistent { key: String, reason: String },

    /// The path algorithm produced no usable path.
    #[error("path algorithm returned an empty path for {key}")]
    EmptyPath { key: String },

    #[error(transparent)]
    Path(#[from] PathError),

    /// A filesystem operation on the key's payload failed.
    #[error("{op} of {key} failed: {source}")]
    FileSystem {
        op: &'static str,
        key: String,
        #[source]
        source: FsError,
    },

    #[error(transparent)]
    Registry(RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<RegistryError> for StoreError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { key } => Self::NotFound { key },
            RegistryError::Inconsistent { key, reason } => Self::Inconsistent { key, reason },
            other => Self::Registry(other),
        }
    }
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
