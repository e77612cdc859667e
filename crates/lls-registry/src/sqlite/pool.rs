use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// A connection on loan from a [`SqlitePool`]; returned to the pool on drop.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Settings for a [`SqlitePool`].
#[derive(Clone, Debug)]
pub struct PoolConfig {
    pub path: PathBuf,
    /// Number of connections kept open.
    pub size: usize,
    /// How long `acquire` waits for a free connection.
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: 4,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Fixed-size `r2d2` pool of SQLite connections to one database file.
///
/// Every connection is opened with a busy timeout and WAL journaling.
#[derive(Clone)]
pub struct SqlitePool {
    inner: Pool<SqliteConnectionManager>,
    path: PathBuf,
    acquire_timeout: Duration,
}

impl SqlitePool {
    /// Open `config.size` connections up front.
    pub fn open(config: &PoolConfig) -> RegistryResult<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RegistryError::Io {
                op: "create database directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let busy_timeout = config.acquire_timeout;
        let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            let _mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            Ok(())
        });

        let size = u32::try_from(config.size.max(1)).unwrap_or(u32::MAX);
        let inner = Pool::builder()
            .max_size(size)
            .min_idle(Some(size))
            .connection_timeout(config.acquire_timeout)
            .build(manager)
            .map_err(|source| RegistryError::PoolOpen {
                path: config.path.clone(),
                source,
            })?;

        debug!(path = %config.path.display(), size, "opened sqlite pool");
        Ok(Self {
            inner,
            path: config.path.clone(),
            acquire_timeout: config.acquire_timeout,
        })
    }

    /// Take a connection, waiting up to the acquire timeout for one to free up.
    pub fn acquire(&self) -> RegistryResult<PooledConnection> {
        self.inner
            .get()
            .map_err(|source| RegistryError::PoolExhausted {
                timeout: self.acquire_timeout,
                source,
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.inner.max_size() as usize
    }

    /// Connections currently waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.inner.state().idle_connections as usize
    }
}

impl std::fmt::Debug for SqlitePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePool")
            .field("path", &self.path)
            .field("size", &self.size())
            .finish()
    }
}
