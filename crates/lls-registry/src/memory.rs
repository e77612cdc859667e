//! In-memory path registry.
//!
//! [`InMemoryPathRegistry`] keeps its entries in a `HashMap` behind a
//! `RwLock`. Nothing survives the process, so a store using it rebuilds the
//! registry from its files at start-up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::RegistryResult;
use crate::keys::check_key;
use crate::traits::PathRegistry;
use crate::types::{Lookup, RegistryContext};

/// A volatile [`PathRegistry`].
pub struct InMemoryPathRegistry {
    entries: RwLock<HashMap<String, PathBuf>>,
    context: RegistryContext,
}

impl InMemoryPathRegistry {
    /// Create an empty registry. Call [`PathRegistry::rebuild`] to load
    /// existing files.
    pub fn new(context: RegistryContext) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            context,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

impl PathRegistry for InMemoryPathRegistry {
    fn context(&self) -> &RegistryContext {
        &self.context
    }

    fn lookup(&self, key: &str) -> RegistryResult<Lookup> {
        let entries = self.entries.read().expect("lock poisoned");
        Ok(match entries.get(key) {
            Some(path) if path.as_os_str().is_empty() => Lookup::Inconsistent {
                reason: "registered path is empty".into(),
            },
            Some(path) => Lookup::Found(path.clone()),
            None => Lookup::NotFound,
        })
    }

    fn put(&self, key: &str, path: &Path) -> RegistryResult<()> {
        check_key(key)?;
        let mut entries = self.entries.write().expect("lock poisoned");
        entries.insert(key.to_string(), path.to_path_buf());
        Ok(())
    }

    fn delete(&self, key: &str) -> RegistryResult<usize> {
        let mut entries = self.entries.write().expect("lock poisoned");
        Ok(usize::from(entries.remove(key).is_some()))
    }

    fn clear(&self) -> RegistryResult<()> {
        self.entries.write().expect("lock poisoned").clear();
        Ok(())
    }

    fn scan_keys(&self, sink: &mut dyn FnMut(&str) -> RegistryResult<()>) -> RegistryResult<()> {
        let entries = self.entries.read().expect("lock poisoned");
        for key in entries.keys() {
            sink(key)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryPathRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPathRegistry")
            .field("entry_count", &self.len())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::types::AuditFinding;
    use lls_fs::{content_from, ContentStream, FileSystem, FsError, FsResult, GenericFileSystem};
    use lls_path::{EncodedPathAlgorithm, PathAlgorithm, TimestampPathAlgorithm};
    use std::io;
    use std::sync::Arc;

    fn context_for(base: &Path, algorithm: Arc<dyn PathAlgorithm>) -> RegistryContext {
        RegistryContext::new(
            vec![base.to_path_buf()],
            Arc::new(GenericFileSystem::new()),
            algorithm,
        )
    }

    fn encoded_registry(base: &Path) -> InMemoryPathRegistry {
        InMemoryPathRegistry::new(context_for(base, Arc::new(EncodedPathAlgorithm::new(base))))
    }

    fn sorted_keys(registry: &dyn PathRegistry) -> Vec<String> {
        let mut keys: Vec<String> = registry.keys().unwrap().map(Result::unwrap).collect();
        keys.sort();
        keys
    }

    /// Delegates to the real filesystem but cannot list directories.
    struct UnlistableFileSystem(GenericFileSystem);

    impl FileSystem for UnlistableFileSystem {
        fn write(&self, path: &Path, content: ContentStream) -> FsResult<u64> {
            self.0.write(path, content)
        }
        fn rewrite(&self, path: &Path, content: ContentStream) -> FsResult<u64> {
            self.0.rewrite(path, content)
        }
        fn read(&self, path: &Path) -> FsResult<ContentStream> {
            self.0.read(path)
        }
        fn delete(&self, path: &Path) -> FsResult<()> {
            self.0.delete(path)
        }
        fn list(&self, dir: &Path) -> FsResult<Vec<String>> {
            Err(FsError::Io {
                op: "list directory",
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        }
        fn is_directory(&self, path: &Path) -> bool {
            self.0.is_directory(path)
        }
        fn exists(&self, path: &Path) -> bool {
            self.0.exists(path)
        }
    }

    // -----------------------------------------------------------------------
    // Point operations
    // -----------------------------------------------------------------------

    #[test]
    fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        registry.put("demo:1", Path::new("/s/demo_1")).unwrap();
        assert_eq!(registry.get("demo:1").unwrap(), PathBuf::from("/s/demo_1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_missing_is_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        assert_eq!(registry.lookup("demo:9").unwrap(), Lookup::NotFound);
        assert!(matches!(
            registry.get("demo:9"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn put_is_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        registry.put("demo:1", Path::new("/a")).unwrap();
        registry.put("demo:1", Path::new("/b")).unwrap();
        assert_eq!(registry.get("demo:1").unwrap(), PathBuf::from("/b"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_path_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        registry.put("demo:1", Path::new("")).unwrap();
        assert!(matches!(
            registry.get("demo:1"),
            Err(RegistryError::Inconsistent { .. })
        ));
    }

    #[test]
    fn remove_present_then_missing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        registry.put("demo:1", Path::new("/a")).unwrap();
        registry.remove("demo:1").unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.remove("demo:1"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn put_rejects_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        assert!(registry.put("demo:1\n", Path::new("/a")).is_err());
    }

    #[test]
    fn keys_enumerates_everything() {
        let dir = tempfile::tempdir().unwrap();
        let algo = Arc::new(EncodedPathAlgorithm::new(dir.path()));
        let registry =
            InMemoryPathRegistry::new(context_for(dir.path(), algo).with_spill_dir(dir.path()));
        for i in 0..25 {
            registry
                .put(&format!("demo:{i}"), Path::new(&format!("/s/demo_{i}")))
                .unwrap();
        }
        let keys = registry.keys().unwrap();
        assert_eq!(keys.len(), 25);
        assert_eq!(keys.count(), 25);
    }

    // -----------------------------------------------------------------------
    // Rebuild
    // -----------------------------------------------------------------------

    #[test]
    fn rebuild_recovers_keys_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let algo = Arc::new(TimestampPathAlgorithm::new(dir.path()));
        let registry = InMemoryPathRegistry::new(context_for(dir.path(), algo.clone()));
        let fs = GenericFileSystem::new();

        let keys = ["demo:1", "demo:2", "demo:1+DC+DC1.0"];
        let mut paths = Vec::new();
        for key in keys {
            let path = algo.get(key).unwrap();
            fs.write(&path, content_from(key)).unwrap();
            paths.push(path);
        }
        fs.write(&dir.path().join("README"), content_from("not a key"))
            .unwrap();

        let report = registry.rebuild().unwrap();
        assert_eq!(report.files_seen, 4);
        assert_eq!(report.registered, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(sorted_keys(&registry), vec!["demo:1", "demo:1+DC+DC1.0", "demo:2"]);
        assert_eq!(registry.get("demo:2").unwrap(), paths[1]);
    }

    #[test]
    fn rebuild_discards_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        registry.put("demo:stale", Path::new("/nowhere")).unwrap();

        registry.rebuild().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn rebuild_counts_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        let fs = GenericFileSystem::new();
        fs.write(&dir.path().join("x/demo_1"), content_from("a")).unwrap();
        fs.write(&dir.path().join("y/demo_1"), content_from("b")).unwrap();

        let report = registry.rebuild().unwrap();
        assert_eq!(report.registered, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_walk_leaves_registry_empty() {
        let dir = tempfile::tempdir().unwrap();
        let context = RegistryContext::new(
            vec![dir.path().to_path_buf()],
            Arc::new(UnlistableFileSystem(GenericFileSystem::new())),
            Arc::new(EncodedPathAlgorithm::new(dir.path())),
        );
        let registry = InMemoryPathRegistry::new(context);
        registry.put("demo:1", Path::new("/a")).unwrap();

        assert!(matches!(registry.rebuild(), Err(RegistryError::Walk(_))));
        assert!(registry.is_empty());
    }

    // -----------------------------------------------------------------------
    // Audit
    // -----------------------------------------------------------------------

    #[test]
    fn audit_registry_reports_missing_file_without_mutating() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        let fs = GenericFileSystem::new();
        let path = dir.path().join("demo/demo_1");
        fs.write(&path, content_from("x")).unwrap();
        registry.put("demo:1", &path).unwrap();
        registry.put("demo:2", &dir.path().join("demo/demo_2")).unwrap();

        let report = registry.audit_registry().unwrap();
        assert_eq!(report.entries_checked, 2);
        assert_eq!(
            report.findings,
            vec![AuditFinding::MissingFile {
                key: "demo:2".into(),
                path: dir.path().join("demo/demo_2"),
            }]
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn audit_files_reports_unregistered_and_mismatched() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        let fs = GenericFileSystem::new();
        let good = dir.path().join("demo/demo_1");
        let moved = dir.path().join("demo/demo_2");
        let orphan = dir.path().join("demo/demo_3");
        for path in [&good, &moved, &orphan] {
            fs.write(path, content_from("x")).unwrap();
        }
        registry.put("demo:1", &good).unwrap();
        registry.put("demo:2", Path::new("/elsewhere/demo_2")).unwrap();

        let report = registry.audit_files().unwrap();
        assert_eq!(report.files_checked, 3);
        assert_eq!(report.findings.len(), 2);
        assert!(report.findings.contains(&AuditFinding::Unregistered {
            key: "demo:3".into(),
            path: orphan,
        }));
        assert!(report.findings.contains(&AuditFinding::PathMismatch {
            key: "demo:2".into(),
            registered: PathBuf::from("/elsewhere/demo_2"),
            actual: moved,
        }));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn clean_store_audits_clean() {
        let dir = tempfile::tempdir().unwrap();
        let registry = encoded_registry(dir.path());
        let fs = GenericFileSystem::new();
        fs.write(&dir.path().join("demo/demo_1"), content_from("x")).unwrap();
        registry.rebuild().unwrap();

        assert!(registry.audit_files().unwrap().is_clean());
        assert!(registry.audit_registry().unwrap().is_clean());
    }

    #[test]
    fn report_serializes_findings() {
        let finding = AuditFinding::MissingFile {
            key: "demo:1".into(),
            path: PathBuf::from("/s/demo_1"),
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["finding"], "missing_file");
        assert_eq!(json["key"], "demo:1");
    }
}
