//! One-shot key enumeration spilled to a temporary file.
//!
//! A [`KeySpill`] collects keys one line at a time; [`KeySpill::finish`]
//! turns it into a [`KeyIter`] that streams them back. The temporary file is
//! deleted as soon as the iterator is exhausted, hits an error, or is dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{RegistryError, RegistryResult};

const SPILL_PREFIX: &str = "lls-keys-";

/// Write side of a key enumeration.
pub struct KeySpill {
    file: NamedTempFile,
    writer: BufWriter<File>,
    count: usize,
}

impl KeySpill {
    /// Create a spill file in `dir`, or the system temp dir.
    pub fn create(dir: Option<&Path>) -> RegistryResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SPILL_PREFIX);
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(RegistryError::Spill)?;
        let writer = BufWriter::new(file.reopen().map_err(RegistryError::Spill)?);
        Ok(Self {
            file,
            writer,
            count: 0,
        })
    }

    pub fn push(&mut self, key: &str) -> RegistryResult<()> {
        check_key(key)?;
        self.writer
            .write_all(key.as_bytes())
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(RegistryError::Spill)?;
        self.count += 1;
        Ok(())
    }

    /// Flush and switch to reading.
    pub fn finish(mut self) -> RegistryResult<KeyIter> {
        self.writer.flush().map_err(RegistryError::Spill)?;
        let reader = BufReader::new(self.file.reopen().map_err(RegistryError::Spill)?);
        Ok(KeyIter {
            inner: Some(SpillReader {
                reader,
                file: self.file,
            }),
            remaining: self.count,
        })
    }
}

/// Keys are spilled one per line, so they must not contain line breaks.
pub(crate) fn check_key(key: &str) -> RegistryResult<()> {
    if key.is_empty() || key.contains(['\n', '\r']) {
        return Err(RegistryError::InvalidKey {
            key: key.to_string(),
            reason: "must be non-empty and contain no line breaks".into(),
        });
    }
    Ok(())
}

struct SpillReader {
    reader: BufReader<File>,
    file: NamedTempFile,
}

/// Forward-only iterator over every key a registry held when it was created.
pub struct KeyIter {
    inner: Option<SpillReader>,
    remaining: usize,
}

impl KeyIter {
    /// Location of the backing file while it still exists.
    pub fn spill_path(&self) -> Option<PathBuf> {
        self.inner.as_ref().map(|s| s.file.path().to_path_buf())
    }

    /// Release the backing file early.
    pub fn close(&mut self) {
        self.inner = None;
        self.remaining = 0;
    }
}

impl Iterator for KeyIter {
    type Item = RegistryResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let spill = self.inner.as_mut()?;
        let mut line = String::new();
        match spill.reader.read_line(&mut line) {
            Ok(0) => {
                self.close();
                None
            }
            Ok(_) => {
                self.remaining = self.remaining.saturating_sub(1);
                if line.ends_with('\n') {
                    line.pop();
                }
                Some(Ok(line))
            }
            Err(e) => {
                self.close();
                Some(Err(RegistryError::Spill(e)))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for KeyIter {}

impl std::fmt::Debug for KeyIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyIter")
            .field("remaining", &self.remaining)
            .field("spill", &self.spill_path())
            .finish()
    }
}
