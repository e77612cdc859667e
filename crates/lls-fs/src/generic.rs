use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::error::{FsError, FsResult};
use crate::traits::{ContentStream, FileSystem};

/// Prefix of the name a file is moved to while it is being rewritten.
///
/// Encoded keys always start with a PID namespace character, never `~`, so
/// a backup name can never collide with a stored key's file.
pub const BACKUP_PREFIX: &str = "~bak.";

/// [`FileSystem`] backed directly by `std::fs`.
#[derive(Clone, Debug, Default)]
pub struct GenericFileSystem {
    /// `fsync` each file after writing it.
    sync_writes: bool,
}

impl GenericFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable `fsync` after every write.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Path the original file is moved to during a rewrite: the same
    /// directory, the name prefixed with [`BACKUP_PREFIX`].
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(BACKUP_PREFIX);
        if let Some(file_name) = path.file_name() {
            name.push(file_name);
        }
        path.with_file_name(name)
    }

    /// Create the file, creating missing parent directories on a second try.
    fn create(&self, path: &Path) -> FsResult<File> {
        match File::create(path) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| FsError::io("create directories", parent, e))?;
                }
                File::create(path).map_err(|e| FsError::io("create file", path, e))
            }
            Err(e) => Err(FsError::io("create file", path, e)),
        }
    }

    fn write_file(&self, path: &Path, mut content: ContentStream) -> FsResult<u64> {
        let file = self.create(path)?;
        let mut writer = BufWriter::new(file);
        let written = io::copy(&mut content, &mut writer)
            .map_err(|e| FsError::io("write content", path, e))?;
        writer
            .flush()
            .map_err(|e| FsError::io("flush content", path, e))?;
        if self.sync_writes {
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| FsError::io("sync file", path, e))?;
        }
        Ok(written)
    }
}

impl FileSystem for GenericFileSystem {
    fn write(&self, path: &Path, content: ContentStream) -> FsResult<u64> {
        let written = self.write_file(path, content)?;
        debug!(path = %path.display(), bytes = written, "wrote file");
        Ok(written)
    }

    fn rewrite(&self, path: &Path, content: ContentStream) -> FsResult<u64> {
        let backup = Self::backup_path(path);
        fs::rename(path, &backup).map_err(|e| FsError::io("move to backup", path, e))?;

        match self.write_file(path, content) {
            Ok(written) => {
                if let Err(e) = fs::remove_file(&backup) {
                    warn!(
                        backup = %backup.display(),
                        error = %e,
                        "could not delete backup after rewrite"
                    );
                }
                debug!(path = %path.display(), bytes = written, "rewrote file");
                Ok(written)
            }
            Err(write_error) => {
                let _ = fs::remove_file(path);
                match fs::rename(&backup, path) {
                    Ok(()) => {
                        warn!(
                            path = %path.display(),
                            error = %write_error,
                            "rewrite failed; original content restored"
                        );
                        Err(write_error)
                    }
                    Err(restore_error) => {
                        error!(
                            path = %path.display(),
                            backup = %backup.display(),
                            error = %write_error,
                            restore_error = %restore_error,
                            "rewrite failed and backup could not be restored"
                        );
                        Err(FsError::RollbackFailed {
                            path: path.to_path_buf(),
                            backup,
                            write_error: write_error.to_string(),
                            source: restore_error,
                        })
                    }
                }
            }
        }
    }

    fn read(&self, path: &Path) -> FsResult<ContentStream> {
        let file = File::open(path).map_err(|e| FsError::io("open for read", path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn delete(&self, path: &Path) -> FsResult<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FsError::io("delete file", path, e)),
        }
    }

    fn list(&self, dir: &Path) -> FsResult<Vec<String>> {
        let entries = fs::read_dir(dir).map_err(|e| FsError::io("list directory", dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::io("list directory", dir, e))?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    warn!(dir = %dir.display(), name = ?raw, "skipping non UTF-8 file name")
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
