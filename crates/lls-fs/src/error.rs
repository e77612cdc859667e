use std::io;
use std::path::PathBuf;

/// Errors from filesystem adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// An I/O call failed. `op` names the step that failed.
    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rewrite failed and the original content could not be put back.
    #[error(
        "rewrite of {} failed ({write_error}) and backup {} could not be restored: {source}",
        path.display(),
        backup.display()
    )]
    RollbackFailed {
        path: PathBuf,
        backup: PathBuf,
        write_error: String,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the underlying cause is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Result alias for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;
