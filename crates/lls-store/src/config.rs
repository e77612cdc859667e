use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lls_path::PathAlgorithmKind;
use lls_registry::PoolConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_OBJECT_TABLE: &str = "objectPaths";
pub const DEFAULT_DATASTREAM_TABLE: &str = "datastreamPaths";

/// Filesystem adapter implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSystemKind {
    #[default]
    Generic,
}

/// Path registry implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathRegistryKind {
    /// Process-local map, rebuilt from the store bases at start-up.
    Memory,
    /// SQLite tables shared through a connection pool.
    #[default]
    Sqlite,
}

impl fmt::Display for PathRegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        })
    }
}

/// Connection settings for the sqlite registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub pool_size: usize,
    pub acquire_timeout_ms: u64,
    pub object_table: String,
    pub datastream_table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("registry.db"),
            pool_size: 4,
            acquire_timeout_ms: 5000,
            object_table: DEFAULT_OBJECT_TABLE.to_string(),
            datastream_table: DEFAULT_DATASTREAM_TABLE.to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            path: self.path.clone(),
            size: self.pool_size,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
        }
    }
}

/// Everything needed to open a [`LowLevelStorage`](crate::LowLevelStorage).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub object_store_base: Option<PathBuf>,
    pub datastream_store_base: Option<PathBuf>,
    pub file_system: FileSystemKind,
    pub path_algorithm: PathAlgorithmKind,
    pub path_registry: PathRegistryKind,
    /// Whether the database treats `\` as an escape in string values.
    pub backslash_is_escape: Option<bool>,
    /// fsync each payload after writing.
    pub sync_writes: bool,
    pub database: Option<DatabaseConfig>,
}

impl StorageConfig {
    /// Config with both store bases set and every other option defaulted.
    pub fn new(
        object_store_base: impl Into<PathBuf>,
        datastream_store_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            object_store_base: Some(object_store_base.into()),
            datastream_store_base: Some(datastream_store_base.into()),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that every required option is present and usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check(true)
    }

    /// Like [`validate`](Self::validate), but the `[database]` table is
    /// optional because the caller supplies the connection pool.
    pub(crate) fn check(&self, require_database: bool) -> Result<(), ConfigError> {
        let (object_base, datastream_base) = self.store_bases()?;
        if object_base.starts_with(&datastream_base) || datastream_base.starts_with(&object_base) {
            return Err(ConfigError::Invalid(format!(
                "store bases must be disjoint: {} and {}",
                object_base.display(),
                datastream_base.display()
            )));
        }

        if self.path_registry == PathRegistryKind::Sqlite {
            if self.backslash_is_escape.is_none() {
                return Err(ConfigError::Missing("backslash_is_escape"));
            }
            match &self.database {
                None if require_database => return Err(ConfigError::Missing("database")),
                Some(db) if db.pool_size == 0 => {
                    return Err(ConfigError::Invalid("database.pool_size must be at least 1".into()))
                }
                Some(db) if db.object_table == db.datastream_table => {
                    return Err(ConfigError::Invalid(format!(
                        "object and datastream tables must differ, both are {}",
                        db.object_table
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Both store bases as absolute paths.
    pub fn store_bases(&self) -> Result<(PathBuf, PathBuf), ConfigError> {
        let object = self
            .object_store_base
            .as_deref()
            .ok_or(ConfigError::Missing("object_store_base"))?;
        let datastream = self
            .datastream_store_base
            .as_deref()
            .ok_or(ConfigError::Missing("datastream_store_base"))?;
        Ok((absolute(object)?, absolute(datastream)?))
    }

    pub fn object_table(&self) -> &str {
        self.database
            .as_ref()
            .map_or(DEFAULT_OBJECT_TABLE, |db| db.object_table.as_str())
    }

    pub fn datastream_table(&self) -> &str {
        self.database
            .as_ref()
            .map_or(DEFAULT_DATASTREAM_TABLE, |db| db.datastream_table.as_str())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("store base is empty".into()));
    }
    std::path::absolute(path)
        .map_err(|e| ConfigError::Invalid(format!("cannot resolve {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        object_store_base = "/var/lls/objects"
        datastream_store_base = "/var/lls/datastreams"
        file_system = "generic"
        path_algorithm = "hashed"
        path_registry = "sqlite"
        backslash_is_escape = true
        sync_writes = true

        [database]
        path = "/var/lls/registry.db"
        pool_size = 8
        acquire_timeout_ms = 250
    "#;

    #[test]
    fn parses_full_config() {
        let c = StorageConfig::from_toml_str(FULL).unwrap();
        assert_eq!(c.object_store_base, Some(PathBuf::from("/var/lls/objects")));
        assert_eq!(c.path_algorithm, PathAlgorithmKind::Hashed);
        assert_eq!(c.path_registry, PathRegistryKind::Sqlite);
        assert_eq!(c.backslash_is_escape, Some(true));
        assert!(c.sync_writes);

        let db = c.database.as_ref().unwrap();
        assert_eq!(db.pool_size, 8);
        assert_eq!(db.object_table, DEFAULT_OBJECT_TABLE);
        let pool = db.pool_config();
        assert_eq!(pool.acquire_timeout, Duration::from_millis(250));
        c.validate().unwrap();
    }

    #[test]
    fn defaults() {
        let c = StorageConfig::default();
        assert_eq!(c.file_system, FileSystemKind::Generic);
        assert_eq!(c.path_algorithm, PathAlgorithmKind::Timestamp);
        assert_eq!(c.path_registry, PathRegistryKind::Sqlite);
        assert!(!c.sync_writes);
        assert_eq!(c.object_table(), "objectPaths");
        assert_eq!(c.datastream_table(), "datastreamPaths");
    }

    #[test]
    fn unknown_implementation_fails_to_parse() {
        let err = StorageConfig::from_toml_str(r#"path_registry = "postgres""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_store_base() {
        let c = StorageConfig {
            datastream_store_base: Some("/b".into()),
            path_registry: PathRegistryKind::Memory,
            ..StorageConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Missing("object_store_base"))));
    }

    #[test]
    fn sqlite_requires_escape_flag_and_database() {
        let mut c = StorageConfig::new("/a", "/b");
        assert!(matches!(c.validate(), Err(ConfigError::Missing("backslash_is_escape"))));

        c.backslash_is_escape = Some(false);
        assert!(matches!(c.validate(), Err(ConfigError::Missing("database"))));
        c.check(false).unwrap();

        c.database = Some(DatabaseConfig::default());
        c.validate().unwrap();
    }

    #[test]
    fn memory_registry_needs_no_database() {
        let mut c = StorageConfig::new("/a", "/b");
        c.path_registry = PathRegistryKind::Memory;
        c.validate().unwrap();
    }

    #[test]
    fn overlapping_store_bases_rejected() {
        let mut c = StorageConfig::new("/data", "/data");
        c.path_registry = PathRegistryKind::Memory;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));

        c.datastream_store_base = Some("/data/datastreams".into());
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn same_table_for_both_namespaces_rejected() {
        let mut c = StorageConfig::new("/a", "/b");
        c.backslash_is_escape = Some(true);
        c.database = Some(DatabaseConfig {
            datastream_table: DEFAULT_OBJECT_TABLE.into(),
            ..DatabaseConfig::default()
        });
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StorageConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
