//! Database lifecycle and connection management
//!
//! `Database` owns an initialized SQLite file (migrations applied) and a
//! small pool of configured connections. `DbHandle` is the lazily
//! initialized owner the server holds: the first `get()` opens the
//! database, later calls return the same instance.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, io_error, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// How long a writer waits for SQLite's write lock before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_IDLE_CONNECTIONS: usize = 8;

/// Open a SQLite database at the given path and configure it
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path).map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Configure a connection
///
/// WAL lets readers proceed alongside a writer without seeing partial
/// writes; `synchronous = FULL` makes every commit durable before it
/// returns.
pub fn configure(conn: &Connection) -> Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT).map_err(from_rusqlite)?;

    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    let _mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;

    conn.pragma_update(None, "synchronous", "FULL")
        .map_err(from_rusqlite)?;

    Ok(())
}

/// An initialized database file plus a pool of idle connections
pub struct Database {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
}

impl Database {
    /// Open (creating if needed) the database file and apply migrations
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create_data_dir", e))?;
        }

        let mut conn = open(&path)?;
        apply_migrations(&mut conn)?;

        tracing::info!(path = %path.display(), "Database ready");

        Ok(Self {
            path,
            idle: Mutex::new(vec![conn]),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` on a pooled connection
    ///
    /// The connection goes back to the pool afterwards, whether `f`
    /// succeeded or not.
    pub fn with_connection<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.checkout()?;
        let result = f(&mut conn);
        self.checkin(conn);
        result
    }

    fn checkout(&self) -> Result<Connection> {
        let pooled = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match pooled {
            Some(conn) => Ok(conn),
            None => open(&self.path),
        }
    }

    fn checkin(&self, conn: Connection) {
        if !conn.is_autocommit() {
            // A transaction was left open; drop the connection instead of reusing it
            return;
        }
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(conn);
        }
    }

    /// Number of idle pooled connections
    pub fn idle_connections(&self) -> usize {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("idle_connections", &self.idle_connections())
            .finish()
    }
}

/// Lazily initialized, explicitly owned database handle
#[derive(Debug)]
pub struct DbHandle {
    path: PathBuf,
    slot: Mutex<Option<Arc<Database>>>,
}

impl DbHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(None),
        }
    }

    /// Return the database, opening it on first use
    ///
    /// Safe to call repeatedly and from several threads; exactly one
    /// `Database` is created until `close()` is called.
    pub fn get(&self) -> Result<Arc<Database>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(db) = slot.as_ref() {
            return Ok(Arc::clone(db));
        }
        let db = Arc::new(Database::open(&self.path)?);
        *slot = Some(Arc::clone(&db));
        Ok(db)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Release the handle's reference; connections close once the last
    /// `Arc<Database>` is dropped
    pub fn close(&self) {
        let db = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if db.is_some() {
            tracing::info!(path = %self.path.display(), "Database closed");
        }
    }
}
