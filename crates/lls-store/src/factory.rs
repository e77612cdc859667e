use std::path::PathBuf;
use std::sync::Arc;

use lls_fs::{FileSystem, GenericFileSystem};
use lls_path::{
    EncodedPathAlgorithm, HashPathAlgorithm, PathAlgorithm, PathAlgorithmKind,
    TimestampPathAlgorithm,
};
use lls_registry::{
    InMemoryPathRegistry, PathEscape, PathRegistry, RegistryContext, SqlitePathRegistry,
    SqlitePool,
};
use lls_types::Namespace;
use tracing::info;

use crate::config::{FileSystemKind, PathRegistryKind, StorageConfig};
use crate::error::{ConfigError, StoreResult};
use crate::store::Store;

pub fn file_system(config: &StorageConfig) -> Arc<dyn FileSystem> {
    match config.file_system {
        FileSystemKind::Generic => {
            Arc::new(GenericFileSystem::new().with_sync_writes(config.sync_writes))
        }
    }
}

pub fn path_algorithm(kind: PathAlgorithmKind, store_base: PathBuf) -> Arc<dyn PathAlgorithm> {
    match kind {
        PathAlgorithmKind::Encoded => Arc::new(EncodedPathAlgorithm::new(store_base)),
        PathAlgorithmKind::Hashed => Arc::new(HashPathAlgorithm::new(store_base)),
        PathAlgorithmKind::Timestamp => Arc::new(TimestampPathAlgorithm::new(store_base)),
    }
}

/// Assemble the store for one namespace.
///
/// `pool` is only consulted for the sqlite registry. A memory registry is
/// rebuilt from the store base before the store is returned.
pub fn build_store(
    namespace: Namespace,
    store_base: PathBuf,
    config: &StorageConfig,
    file_system: Arc<dyn FileSystem>,
    pool: Option<&Arc<SqlitePool>>,
) -> StoreResult<Store> {
    let algorithm = path_algorithm(config.path_algorithm, store_base.clone());
    let context = RegistryContext::new(
        vec![store_base.clone()],
        file_system.clone(),
        algorithm.clone(),
    );

    let registry: Arc<dyn PathRegistry> = match config.path_registry {
        PathRegistryKind::Memory => {
            let registry = InMemoryPathRegistry::new(context);
            let report = registry.rebuild()?;
            info!(%namespace, registered = report.registered, "memory registry loaded");
            Arc::new(registry)
        }
        PathRegistryKind::Sqlite => {
            let pool = pool.ok_or(ConfigError::Missing("database"))?;
            let escape = PathEscape::from_flag(
                config
                    .backslash_is_escape
                    .ok_or(ConfigError::Missing("backslash_is_escape"))?,
            );
            let table = match namespace {
                Namespace::Object => config.object_table(),
                Namespace::Datastream => config.datastream_table(),
            };
            Arc::new(SqlitePathRegistry::new(pool.clone(), table, escape, context)?)
        }
    };

    info!(
        %namespace,
        base = %store_base.display(),
        algorithm = %config.path_algorithm,
        registry = %config.path_registry,
        "store ready"
    );
    Ok(Store::new(namespace, algorithm, file_system, registry))
}
