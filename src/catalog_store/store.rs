//! SQLite-backed catalog store.
//!
//! The store owns the single write connection to the catalog database and
//! hands out [`Session`]s, each wrapping one transaction.

use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::session::Session;
use crate::sqlite_persistence::{migrate_if_needed, register_text_folding};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Opens (creating if needed) the catalog database at `db_path` and brings
    /// its schema up to date.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();

        let mut conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open catalog database {:?}", db_path))?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        register_text_folding(&conn)?;
        migrate_if_needed(&mut conn, CATALOG_VERSIONED_SCHEMAS)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        log_counts(&conn);

        Ok(Self::from_connection(conn))
    }

    /// A private, non-persistent catalog. Used by tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("Failed to open in-memory catalog")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        register_text_folding(&conn)?;
        migrate_if_needed(&mut conn, CATALOG_VERSIONED_SCHEMAS)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` inside a fresh session.
    ///
    /// The transaction is committed when `f` returns `Ok` and rolled back
    /// when it returns `Err`, so a failed request never leaves partial writes
    /// behind.
    pub fn session<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Session<'_>) -> std::result::Result<T, E>,
        E: From<rusqlite::Error>,
    {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let session = Session::begin(&conn)?;

        match f(&session) {
            Ok(value) => match session.commit() {
                Ok(()) => Ok(value),
                Err(e) => {
                    session.rollback();
                    Err(e.into())
                }
            },
            Err(e) => {
                debug!("Rolling back catalog session");
                session.rollback();
                Err(e)
            }
        }
    }
}

fn log_counts(conn: &Connection) {
    let count = |table: &str| -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap_or(0)
    };

    info!(
        "Opened catalog: {} authors, {} books, {} genres, {} publishers",
        count("authors"),
        count("books"),
        count("genres"),
        count("publishers")
    );
}
