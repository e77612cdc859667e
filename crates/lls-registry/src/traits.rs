//! The [`PathRegistry`] trait: the index from logical key to file path.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::keys::{KeyIter, KeySpill};
use crate::types::{AuditFinding, AuditReport, Lookup, RebuildReport, RegistryContext};
use crate::walk::walk_files;

/// Index mapping each stored key to the path chosen for it at creation time.
///
/// The registry is the single source of truth for whether a key is stored.
/// Backends implement the primitive operations; lookups with strict
/// cardinality, key enumeration, rebuild and audit are provided on top.
///
/// Implementations perform no locking across operations. Concurrent calls
/// for the same key race, and rebuild must only run while the store is
/// otherwise idle.
pub trait PathRegistry: Send + Sync {
    /// The store this registry indexes.
    fn context(&self) -> &RegistryContext;

    /// Look up the path recorded for `key`.
    fn lookup(&self, key: &str) -> RegistryResult<Lookup>;

    /// Insert or replace the entry for `key`.
    fn put(&self, key: &str, path: &Path) -> RegistryResult<()>;

    /// Delete every entry for `key`, returning how many there were.
    fn delete(&self, key: &str) -> RegistryResult<usize>;

    /// Remove all entries.
    fn clear(&self) -> RegistryResult<()>;

    /// Feed every stored key to `sink`.
    fn scan_keys(&self, sink: &mut dyn FnMut(&str) -> RegistryResult<()>) -> RegistryResult<()>;

    /// Path recorded for `key`, failing if it is absent or inconsistent.
    fn get(&self, key: &str) -> RegistryResult<PathBuf> {
        match self.lookup(key)? {
            Lookup::Found(path) => Ok(path),
            Lookup::NotFound => Err(RegistryError::NotFound {
                key: key.to_string(),
            }),
            Lookup::Inconsistent { reason } => {
                error!(key, %reason, "registry inconsistency");
                Err(RegistryError::Inconsistent {
                    key: key.to_string(),
                    reason,
                })
            }
        }
    }

    /// Remove the single entry for `key`.
    fn remove(&self, key: &str) -> RegistryResult<()> {
        match self.delete(key)? {
            0 => Err(RegistryError::NotFound {
                key: key.to_string(),
            }),
            1 => {
                debug!(key, "unregistered");
                Ok(())
            }
            n => {
                let reason = format!("removed {n} entries for one key");
                error!(key, %reason, "registry inconsistency");
                Err(RegistryError::Inconsistent {
                    key: key.to_string(),
                    reason,
                })
            }
        }
    }

    /// Snapshot every key into a one-shot iterator backed by a temp file.
    fn keys(&self) -> RegistryResult<KeyIter> {
        let mut spill = KeySpill::create(self.context().spill_dir.as_deref())?;
        self.scan_keys(&mut |key: &str| spill.push(key))?;
        spill.finish()
    }

    /// Discard every entry and re-derive the registry from the files under
    /// the store bases.
    ///
    /// Files whose names do not decode are logged and skipped. If the walk
    /// itself fails the registry is cleared again and the error returned.
    fn rebuild(&self) -> RegistryResult<RebuildReport> {
        let ctx = self.context().clone();
        info!(bases = ?ctx.store_bases, "rebuilding path registry");
        self.clear()?;

        let mut report = RebuildReport::default();
        let mut visit = |path: &Path| -> RegistryResult<()> {
            report.files_seen += 1;
            let key = match ctx.algorithm.key_for_path(path) {
                Ok(key) => key,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping undecodable file");
                    report.skipped += 1;
                    return Ok(());
                }
            };
            if let Lookup::Found(existing) = self.lookup(&key)? {
                warn!(
                    key,
                    kept = %path.display(),
                    dropped = %existing.display(),
                    "duplicate file for key"
                );
                report.duplicates += 1;
            } else {
                report.registered += 1;
            }
            self.put(&key, path)
        };

        for base in &ctx.store_bases {
            if let Err(e) = walk_files(ctx.file_system.as_ref(), base, &mut visit) {
                error!(base = %base.display(), error = %e, "rebuild aborted");
                if let Err(clear_err) = self.clear() {
                    error!(error = %clear_err, "could not clear registry after failed rebuild");
                }
                return Err(e);
            }
        }

        info!(
            files = report.files_seen,
            registered = report.registered,
            skipped = report.skipped,
            duplicates = report.duplicates,
            "rebuild complete"
        );
        Ok(report)
    }

    /// Check every file under the store bases against the registry.
    fn audit_files(&self) -> RegistryResult<AuditReport> {
        let ctx = self.context().clone();
        let mut report = AuditReport::default();
        let mut visit = |path: &Path| -> RegistryResult<()> {
            report.files_checked += 1;
            let finding = match ctx.algorithm.key_for_path(path) {
                Err(e) => Some(AuditFinding::Undecodable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }),
                Ok(key) => match self.lookup(&key)? {
                    Lookup::Found(registered) if registered == path => None,
                    Lookup::Found(registered) => Some(AuditFinding::PathMismatch {
                        key,
                        registered,
                        actual: path.to_path_buf(),
                    }),
                    Lookup::NotFound => Some(AuditFinding::Unregistered {
                        key,
                        path: path.to_path_buf(),
                    }),
                    Lookup::Inconsistent { reason } => {
                        Some(AuditFinding::Inconsistent { key, reason })
                    }
                },
            };
            if let Some(finding) = finding {
                warn!(%finding, "audit finding");
                report.findings.push(finding);
            }
            Ok(())
        };

        for base in &ctx.store_bases {
            walk_files(ctx.file_system.as_ref(), base, &mut visit)?;
        }
        info!(
            files = report.files_checked,
            findings = report.findings.len(),
            "file audit complete"
        );
        Ok(report)
    }

    /// Check that every registered path still has a file behind it.
    fn audit_registry(&self) -> RegistryResult<AuditReport> {
        let fs = self.context().file_system.clone();
        let mut report = AuditReport::default();
        for key in self.keys()? {
            let key = key?;
            report.entries_checked += 1;
            let finding = match self.lookup(&key)? {
                Lookup::Found(path) if fs.exists(&path) => None,
                Lookup::Found(path) => Some(AuditFinding::MissingFile { key, path }),
                // Removed since the key snapshot was taken.
                Lookup::NotFound => None,
                Lookup::Inconsistent { reason } => Some(AuditFinding::Inconsistent { key, reason }),
            };
            if let Some(finding) = finding {
                warn!(%finding, "audit finding");
                report.findings.push(finding);
            }
        }
        info!(
            entries = report.entries_checked,
            findings = report.findings.len(),
            "registry audit complete"
        );
        Ok(report)
    }
}
