//! Durable path registry backed by a SQLite table.
//!
//! Each store owns one two-column table:
//!
//! ```text
//! token TEXT NOT NULL UNIQUE   -- the logical key
//! path  TEXT NOT NULL          -- the escaped file path
//! ```
//!
//! Connections come from a shared [`SqlitePool`]; every operation borrows one
//! for its own duration only.

mod escape;
mod pool;

pub use escape::{PathEscape, DEFAULT_ESCAPE};
pub use pool::{PoolConfig, PooledConnection, SqlitePool};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::params;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::keys::check_key;
use crate::traits::PathRegistry;
use crate::types::{Lookup, RegistryContext};

/// A [`PathRegistry`] persisted in a SQLite table.
pub struct SqlitePathRegistry {
    pool: Arc<SqlitePool>,
    table: String,
    escape: PathEscape,
    context: RegistryContext,
}

impl SqlitePathRegistry {
    /// Bind to `table`, creating it if needed.
    pub fn new(
        pool: Arc<SqlitePool>,
        table: &str,
        escape: PathEscape,
        context: RegistryContext,
    ) -> RegistryResult<Self> {
        validate_table_name(table)?;
        let conn = pool.acquire()?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    token TEXT NOT NULL UNIQUE,
                    path TEXT NOT NULL
                )"
            ),
            [],
        )
        .map_err(RegistryError::sqlite("create table"))?;
        drop(conn);

        debug!(table, escape = escape.is_enabled(), "sqlite path registry ready");
        Ok(Self {
            pool,
            table: table.to_string(),
            escape,
            context,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Number of rows in the table.
    pub fn len(&self) -> RegistryResult<usize> {
        let conn = self.pool.acquire()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| {
                row.get(0)
            })
            .map_err(RegistryError::sqlite("count"))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn validate_table_name(table: &str) -> RegistryResult<()> {
    let mut chars = table.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidTable(table.to_string()))
    }
}

impl PathRegistry for SqlitePathRegistry {
    fn context(&self) -> &RegistryContext {
        &self.context
    }

    fn lookup(&self, key: &str) -> RegistryResult<Lookup> {
        let conn = self.pool.acquire()?;
        let mut stmt = conn
            .prepare_cached(&format!("SELECT path FROM {} WHERE token = ?1", self.table))
            .map_err(RegistryError::sqlite("prepare lookup"))?;
        let paths = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .map_err(RegistryError::sqlite("lookup"))?
            .take(2)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RegistryError::sqlite("read lookup row"))?;

        Ok(match paths.as_slice() {
            [] => Lookup::NotFound,
            [stored] if stored.is_empty() => Lookup::Inconsistent {
                reason: "registered path is empty".into(),
            },
            [stored] => Lookup::Found(PathBuf::from(self.escape.unescape(stored))),
            _ => Lookup::Inconsistent {
                reason: "more than one registered path".into(),
            },
        })
    }

    fn put(&self, key: &str, path: &Path) -> RegistryResult<()> {
        check_key(key)?;
        let raw = path
            .to_str()
            .ok_or_else(|| RegistryError::NonUtf8Path(path.to_path_buf()))?;
        let conn = self.pool.acquire()?;
        conn.prepare_cached(&format!(
            "REPLACE INTO {} (token, path) VALUES (?1, ?2)",
            self.table
        ))
        .and_then(|mut stmt| stmt.execute(params![key, self.escape.escape(raw)]))
        .map_err(RegistryError::sqlite("upsert"))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> RegistryResult<usize> {
        let conn = self.pool.acquire()?;
        let removed = conn
            .prepare_cached(&format!("DELETE FROM {} WHERE token = ?1", self.table))
            .and_then(|mut stmt| stmt.execute(params![key]))
            .map_err(RegistryError::sqlite("delete"))?;
        Ok(removed)
    }

    fn clear(&self) -> RegistryResult<()> {
        let conn = self.pool.acquire()?;
        conn.execute(&format!("DELETE FROM {}", self.table), [])
            .map_err(RegistryError::sqlite("clear"))?;
        Ok(())
    }

    fn scan_keys(&self, sink: &mut dyn FnMut(&str) -> RegistryResult<()>) -> RegistryResult<()> {
        let conn = self.pool.acquire()?;
        let mut stmt = conn
            .prepare(&format!("SELECT token FROM {}", self.table))
            .map_err(RegistryError::sqlite("prepare key scan"))?;
        let mut rows = stmt.query([]).map_err(RegistryError::sqlite("key scan"))?;
        while let Some(row) = rows.next().map_err(RegistryError::sqlite("key scan"))? {
            let key: String = row.get(0).map_err(RegistryError::sqlite("read key"))?;
            sink(&key)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqlitePathRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePathRegistry")
            .field("table", &self.table)
            .field("pool", &self.pool)
            .field("escape", &self.escape)
            .finish()
    }
}
