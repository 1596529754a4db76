use super::models::Genre;
use super::query::{order_by, GenreSortField, NameFilter, SortField, SortOrder, WhereClause};
use super::repository::{Entity, Repository};
use super::session::Session;
use anyhow::Result;
use rusqlite::{Row, ToSql};

impl Entity for Genre {
    const TABLE: &'static str = "genres";
    const KIND: &'static str = "Genre";
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
        })
    }

    fn column_values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name, &self.description]
    }
}

pub struct GenreRepository<'c> {
    rows: Repository<'c, Genre>,
}

impl<'c> GenreRepository<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        GenreRepository {
            rows: Repository::new(session),
        }
    }

    pub fn list(&self) -> Result<Vec<Genre>> {
        self.rows.list("id ASC")
    }

    /// All genres by name, ascending.
    pub fn list_sorted(&self) -> Result<Vec<Genre>> {
        self.rows
            .list(&order_by(GenreSortField::Name, SortOrder::Asc))
    }

    pub fn list_filtered(&self, filter: &NameFilter) -> Result<Vec<Genre>> {
        let clause = WhereClause::new().contains("name", filter.name.as_deref());
        let sort = GenreSortField::resolve(filter.sort_by.as_deref());
        self.rows.query(&clause, &order_by(sort, filter.order))
    }

    pub fn get(&self, id: i64) -> Result<Option<Genre>> {
        self.rows.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Genre>> {
        self.rows.find_by("name", &name)
    }

    pub fn create(&self, genre: Genre) -> Result<Genre> {
        self.rows.create(genre)
    }

    pub fn update(&self, genre: &Genre) -> Result<Genre> {
        self.rows.update(genre)
    }

    pub fn delete(&self, genre: &Genre) -> Result<bool> {
        self.rows.delete(genre)
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        self.rows.exists(id)
    }
}
