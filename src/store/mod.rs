//! SQLite-backed storage.
//!
//! The [`Store`] is a connection provider, not a connection: it holds the
//! database path and hands out one scoped [`Connection`] per request via
//! [`Store::connect`]. The connection is released when it drops, success or
//! failure, so no handler can leak storage state across requests. SQLite's
//! own locking governs cross-request serialization.
//!
//! The fixed schema (see [`schema`]) is declared once and created if absent
//! when the store is opened; there is no migration versioning.

pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

/// Errors that can occur opening or connecting to the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// SQLite connection provider for the fixed schema.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open the store, creating the database file and the fixed schema if
    /// they do not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self { path };
        let conn = store.connect()?;
        conn.execute_batch(&schema::schema_ddl())?;

        Ok(store)
    }

    /// Open a new scoped connection.
    ///
    /// Callers hold the connection for the duration of one request and drop
    /// it unconditionally afterwards.
    pub fn connect(&self) -> StoreResult<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
