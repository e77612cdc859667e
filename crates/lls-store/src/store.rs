use std::path::PathBuf;
use std::sync::Arc;

use lls_fs::{ContentStream, FileSystem};
use lls_path::PathAlgorithm;
use lls_registry::{AuditReport, KeyIter, Lookup, PathRegistry, RebuildReport};
use lls_types::Namespace;
use tracing::{debug, error, warn};

use crate::error::{StoreError, StoreResult};

/// One namespace of stored payloads: a path algorithm, a filesystem and a
/// registry bound together.
///
/// Each key moves `absent -> present` on [`add`](Store::add), stays present
/// across [`replace`](Store::replace), and goes back to absent on
/// [`remove`](Store::remove). The registry decides which state a key is in.
///
/// No locking is done here. Callers serialize operations on the same key.
pub struct Store {
    namespace: Namespace,
    algorithm: Arc<dyn PathAlgorithm>,
    file_system: Arc<dyn FileSystem>,
    registry: Arc<dyn PathRegistry>,
}

impl Store {
    pub fn new(
        namespace: Namespace,
        algorithm: Arc<dyn PathAlgorithm>,
        file_system: Arc<dyn FileSystem>,
        registry: Arc<dyn PathRegistry>,
    ) -> Self {
        Self {
            namespace,
            algorithm,
            file_system,
            registry,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn registry(&self) -> &Arc<dyn PathRegistry> {
        &self.registry
    }

    /// Store a new payload under `key`.
    ///
    /// The file is written before the registry entry is committed. If the
    /// write fails nothing is registered; a partial file may remain until
    /// the next rebuild.
    pub fn add(&self, key: &str, content: ContentStream) -> StoreResult<PathBuf> {
        match self.registry.lookup(key)? {
            Lookup::NotFound => {}
            Lookup::Found(_) => {
                return Err(StoreError::AlreadyExists {
                    key: key.to_string(),
                })
            }
            Lookup::Inconsistent { reason } => {
                error!(namespace = %self.namespace, key, %reason, "registry inconsistency on add");
                return Err(StoreError::Inconsistent {
                    key: key.to_string(),
                    reason,
                });
            }
        }

        let path = self.algorithm.get(key)?;
        if path.as_os_str().is_empty() {
            return Err(StoreError::EmptyPath {
                key: key.to_string(),
            });
        }

        let bytes = self
            .file_system
            .write(&path, content)
            .map_err(|source| StoreError::FileSystem {
                op: "add",
                key: key.to_string(),
                source,
            })?;
        self.registry.put(key, &path)?;

        debug!(namespace = %self.namespace, key, path = %path.display(), bytes, "added");
        Ok(path)
    }

    /// Overwrite the payload of an existing key in place.
    pub fn replace(&self, key: &str, content: ContentStream) -> StoreResult<()> {
        let path = self.registry.get(key)?;
        let bytes = self
            .file_system
            .rewrite(&path, content)
            .map_err(|source| StoreError::FileSystem {
                op: "replace",
                key: key.to_string(),
                source,
            })?;
        debug!(namespace = %self.namespace, key, path = %path.display(), bytes, "replaced");
        Ok(())
    }

    /// Open the payload stored under `key`.
    pub fn retrieve(&self, key: &str) -> StoreResult<ContentStream> {
        let path = self.registry.get(key)?;
        self.file_system
            .read(&path)
            .map_err(|source| StoreError::FileSystem {
                op: "retrieve",
                key: key.to_string(),
                source,
            })
    }

    /// Forget `key` and delete its file.
    ///
    /// The registry entry goes first. A file that cannot be deleted is left
    /// behind and logged; the key is removed either way.
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.registry.get(key)?;
        self.registry.remove(key)?;
        if let Err(e) = self.file_system.delete(&path) {
            warn!(
                namespace = %self.namespace,
                key,
                path = %path.display(),
                error = %e,
                "file left behind after remove"
            );
        }
        debug!(namespace = %self.namespace, key, "removed");
        Ok(())
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> StoreResult<bool> {
        match self.registry.lookup(key)? {
            Lookup::Found(_) => Ok(true),
            Lookup::NotFound => Ok(false),
            Lookup::Inconsistent { reason } => Err(StoreError::Inconsistent {
                key: key.to_string(),
                reason,
            }),
        }
    }

    /// Regenerate the registry from the files on disk.
    pub fn rebuild(&self) -> StoreResult<RebuildReport> {
        Ok(self.registry.rebuild()?)
    }

    /// Audit files against the registry, then the registry against files.
    pub fn audit(&self) -> StoreResult<AuditReport> {
        let mut report = self.registry.audit_files()?;
        report.merge(self.registry.audit_registry()?);
        Ok(report)
    }

    /// Every stored key, streamed from a temporary spill.
    pub fn list(&self) -> StoreResult<KeyIter> {
        Ok(self.registry.keys()?)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("namespace", &self.namespace)
            .field("algorithm", &self.algorithm)
            .field("store_base", &self.algorithm.store_base())
            .finish()
    }
}
