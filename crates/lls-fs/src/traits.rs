use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::FsResult;

/// Owned stream of payload bytes.
///
/// Ownership moves into the adapter, so the stream is closed when the
/// operation returns regardless of outcome.
pub type ContentStream = Box<dyn Read + Send>;

/// Wrap an in-memory buffer as a [`ContentStream`].
pub fn content_from(bytes: impl Into<Vec<u8>>) -> ContentStream {
    Box::new(Cursor::new(bytes.into()))
}

/// Durable byte storage used by a store.
///
/// Implementations must be thread-safe. Operations on distinct paths may run
/// concurrently; operations on the same path are serialized by the caller.
pub trait FileSystem: Send + Sync {
    /// Write `content` to a new file at `path`, creating parent directories
    /// as needed. Returns the number of bytes written.
    fn write(&self, path: &Path, content: ContentStream) -> FsResult<u64>;

    /// Replace the content of the existing file at `path`.
    ///
    /// Must appear atomic to callers: if the new content cannot be written,
    /// the original content is readable at `path` when this returns.
    fn rewrite(&self, path: &Path, content: ContentStream) -> FsResult<u64>;

    /// Open the file at `path` for reading.
    fn read(&self, path: &Path) -> FsResult<ContentStream>;

    /// Remove the file at `path`. A file that is already gone is not an error.
    fn delete(&self, path: &Path) -> FsResult<()>;

    /// Names of the entries directly inside `dir`.
    fn list(&self, dir: &Path) -> FsResult<Vec<String>>;

    fn is_directory(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;
}
