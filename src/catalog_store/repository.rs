//! Generic row accessor shared by every catalog entity.
//!
//! An [`Entity`] describes how one model maps onto its table. [`Repository`]
//! turns that description into the plain CRUD statements; the per-entity
//! repositories build eager resolution and specific lookups on top of it.

use super::query::WhereClause;
use super::session::Session;
use anyhow::{bail, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::marker::PhantomData;
use tracing::debug;

/// A model persisted as one row of `TABLE`.
///
/// Rows are always selected as `id` followed by `COLUMNS`, in order, and
/// `from_row` reads them back in that layout.
pub trait Entity: Sized {
    const TABLE: &'static str;
    /// Human readable entity name used in log lines and error messages.
    const KIND: &'static str;
    /// Every column except `id`.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
    /// Values bound to `COLUMNS`, same order.
    fn column_values(&self) -> Vec<&dyn ToSql>;
}

pub struct Repository<'c, E> {
    conn: &'c Connection,
    _entity: PhantomData<E>,
}

impl<'c, E: Entity> Repository<'c, E> {
    pub fn new(session: &Session<'c>) -> Self {
        Repository {
            conn: session.conn(),
            _entity: PhantomData,
        }
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    fn select_sql() -> String {
        format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
    }

    pub fn list(&self, order_by: &str) -> Result<Vec<E>> {
        self.query(&WhereClause::new(), order_by)
    }

    pub fn query(&self, clause: &WhereClause, order_by: &str) -> Result<Vec<E>> {
        let sql = format!("{}{} ORDER BY {}", Self::select_sql(), clause.to_sql(), order_by);
        debug!("Listing {}: {}", E::TABLE, sql);

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(clause.params()), E::from_row)?
            .collect::<rusqlite::Result<Vec<E>>>()?;
        Ok(rows)
    }

    pub fn get(&self, id: i64) -> Result<Option<E>> {
        let sql = format!("{} WHERE id = ?1", Self::select_sql());
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.query_row(params![id], E::from_row).optional()?)
    }

    /// First row (lowest id) whose `column` equals `value` exactly.
    pub fn find_by(&self, column: &str, value: &dyn ToSql) -> Result<Option<E>> {
        let sql = format!(
            "{} WHERE {} = ?1 ORDER BY id LIMIT 1",
            Self::select_sql(),
            column
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.query_row(params![value], E::from_row).optional()?)
    }

    /// All rows whose `column` equals `value`, in id order.
    pub fn all_by(&self, column: &str, value: i64) -> Result<Vec<E>> {
        let clause = WhereClause::new().equals(column, Some(value));
        self.query(&clause, "id ASC")
    }

    /// Inserts `entity`, ignoring its current id, and returns it with the id
    /// SQLite assigned.
    pub fn create(&self, mut entity: E) -> Result<E> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders
        );

        self.conn
            .execute(&sql, params_from_iter(entity.column_values()))?;
        entity.set_id(self.conn.last_insert_rowid());
        debug!("Inserted {} {}", E::KIND, entity.id());
        Ok(entity)
    }

    /// Writes every column of `entity` back to its row and returns the row as
    /// stored.
    pub fn update(&self, entity: &E) -> Result<E> {
        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            E::TABLE,
            assignments,
            E::COLUMNS.len() + 1
        );

        let id = entity.id();
        let mut values = entity.column_values();
        values.push(&id);

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            bail!("{} with id {} not found", E::KIND, id);
        }
        debug!("Updated {} {}", E::KIND, id);

        match self.get(id)? {
            Some(stored) => Ok(stored),
            None => bail!("{} with id {} vanished during update", E::KIND, id),
        }
    }

    /// Removes the row. Returns false when there was nothing to delete.
    pub fn delete(&self, entity: &E) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
        let deleted = self.conn.execute(&sql, params![entity.id()])?;
        Ok(deleted > 0)
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", E::TABLE);
        Ok(self.conn.query_row(&sql, params![id], |r| r.get(0))?)
    }

    pub fn count_where(&self, column: &str, value: i64) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", E::TABLE, column);
        Ok(self.conn.query_row(&sql, params![value], |r| r.get(0))?)
    }
}
