//! Explicit transaction handle threaded through every catalog call.

use rusqlite::Connection;
use tracing::warn;

/// One unit of work against the catalog database.
///
/// A session wraps an open `BEGIN IMMEDIATE` transaction. It is handed by
/// reference to every accessor and business-rule call made on behalf of a
/// single request; the owning [`super::SqliteCatalogStore::session`] commits
/// it when the request succeeds and rolls it back otherwise.
pub struct Session<'c> {
    conn: &'c Connection,
}

impl<'c> Session<'c> {
    pub(super) fn begin(conn: &'c Connection) -> rusqlite::Result<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    pub(super) fn commit(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch("COMMIT")
    }

    pub(super) fn rollback(self) {
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            warn!("Failed to roll back catalog session: {}", e);
        }
    }
}
