use std::sync::Arc;

use lls_fs::ContentStream;
use lls_registry::{AuditReport, KeyIter, RebuildReport, SqlitePool};
use lls_types::{DatastreamKey, Namespace};
use tracing::info;

use crate::config::{PathRegistryKind, StorageConfig};
use crate::error::{ConfigError, StoreResult};
use crate::factory::{build_store, file_system};
use crate::store::Store;

/// Entry point of the engine: an object store and a datastream store opened
/// from one configuration.
///
/// The two namespaces never share keys. `demo:1` in the object store and
/// `demo:1` in the datastream store are unrelated entries.
#[derive(Debug)]
pub struct LowLevelStorage {
    objects: Store,
    datastreams: Store,
}

impl LowLevelStorage {
    /// Open both stores, building the connection pool from `[database]`
    /// when the sqlite registry is selected.
    pub fn open(config: &StorageConfig) -> StoreResult<Self> {
        config.validate()?;
        let pool = match config.path_registry {
            PathRegistryKind::Sqlite => {
                let database = config
                    .database
                    .as_ref()
                    .ok_or(ConfigError::Missing("database"))?;
                Some(Arc::new(SqlitePool::open(&database.pool_config())?))
            }
            PathRegistryKind::Memory => None,
        };
        Self::assemble(config, pool)
    }

    /// Open both stores over a caller-supplied connection pool.
    pub fn open_with_pool(config: &StorageConfig, pool: Arc<SqlitePool>) -> StoreResult<Self> {
        config.check(false)?;
        Self::assemble(config, Some(pool))
    }

    fn assemble(config: &StorageConfig, pool: Option<Arc<SqlitePool>>) -> StoreResult<Self> {
        let (object_base, datastream_base) = config.store_bases()?;
        let fs = file_system(config);
        let objects = build_store(
            Namespace::Object,
            object_base,
            config,
            fs.clone(),
            pool.as_ref(),
        )?;
        let datastreams = build_store(
            Namespace::Datastream,
            datastream_base,
            config,
            fs,
            pool.as_ref(),
        )?;
        info!(registry = %config.path_registry, "low-level storage opened");
        Ok(Self {
            objects,
            datastreams,
        })
    }

    pub fn store(&self, namespace: Namespace) -> &Store {
        match namespace {
            Namespace::Object => &self.objects,
            Namespace::Datastream => &self.datastreams,
        }
    }

    pub fn objects(&self) -> &Store {
        &self.objects
    }

    pub fn datastreams(&self) -> &Store {
        &self.datastreams
    }

    // ---- Objects ----

    pub fn add_object(&self, pid: &str, content: ContentStream) -> StoreResult<()> {
        self.objects.add(pid, content).map(drop)
    }

    pub fn replace_object(&self, pid: &str, content: ContentStream) -> StoreResult<()> {
        self.objects.replace(pid, content)
    }

    pub fn retrieve_object(&self, pid: &str) -> StoreResult<ContentStream> {
        self.objects.retrieve(pid)
    }

    pub fn remove_object(&self, pid: &str) -> StoreResult<()> {
        self.objects.remove(pid)
    }

    pub fn rebuild_objects(&self) -> StoreResult<RebuildReport> {
        self.objects.rebuild()
    }

    pub fn audit_objects(&self) -> StoreResult<AuditReport> {
        self.objects.audit()
    }

    pub fn list_objects(&self) -> StoreResult<KeyIter> {
        self.objects.list()
    }

    // ---- Datastreams ----

    pub fn add_datastream(&self, key: &str, content: ContentStream) -> StoreResult<()> {
        self.datastreams.add(key, content).map(drop)
    }

    pub fn replace_datastream(&self, key: &str, content: ContentStream) -> StoreResult<()> {
        self.datastreams.replace(key, content)
    }

    pub fn retrieve_datastream(&self, key: &str) -> StoreResult<ContentStream> {
        self.datastreams.retrieve(key)
    }

    pub fn remove_datastream(&self, key: &str) -> StoreResult<()> {
        self.datastreams.remove(key)
    }

    pub fn rebuild_datastreams(&self) -> StoreResult<RebuildReport> {
        self.datastreams.rebuild()
    }

    pub fn audit_datastreams(&self) -> StoreResult<AuditReport> {
        self.datastreams.audit()
    }

    pub fn list_datastreams(&self) -> StoreResult<KeyIter> {
        self.datastreams.list()
    }

    /// Store one version of a datastream.
    pub fn add_datastream_version(
        &self,
        key: &DatastreamKey,
        content: ContentStream,
    ) -> StoreResult<()> {
        self.add_datastream(&key.to_string(), content)
    }

    pub fn retrieve_datastream_version(&self, key: &DatastreamKey) -> StoreResult<ContentStream> {
        self.retrieve_datastream(&key.to_string())
    }

    /// Rebuild both registries, objects first.
    pub fn rebuild_all(&self) -> StoreResult<(RebuildReport, RebuildReport)> {
        Ok((self.rebuild_objects()?, self.rebuild_datastreams()?))
    }
}
