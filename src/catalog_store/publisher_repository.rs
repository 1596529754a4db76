use super::models::Publisher;
use super::query::{order_by, NameFilter, PublisherSortField, SortField, SortOrder, WhereClause};
use super::repository::{Entity, Repository};
use super::session::Session;
use anyhow::Result;
use rusqlite::{Row, ToSql};

impl Entity for Publisher {
    const TABLE: &'static str = "publishers";
    const KIND: &'static str = "Publisher";
    const COLUMNS: &'static [&'static str] = &["name", "website", "description", "creation_date"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Publisher {
            id: row.get(0)?,
            name: row.get(1)?,
            website: row.get(2)?,
            description: row.get(3)?,
            creation_date: row.get(4)?,
        })
    }

    fn column_values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.name,
            &self.website,
            &self.description,
            &self.creation_date,
        ]
    }
}

pub struct PublisherRepository<'c> {
    rows: Repository<'c, Publisher>,
}

impl<'c> PublisherRepository<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        PublisherRepository {
            rows: Repository::new(session),
        }
    }

    pub fn list(&self) -> Result<Vec<Publisher>> {
        self.rows.list("id ASC")
    }

    /// All publishers by name, ascending.
    pub fn list_sorted(&self) -> Result<Vec<Publisher>> {
        self.rows
            .list(&order_by(PublisherSortField::Name, SortOrder::Asc))
    }

    pub fn list_filtered(&self, filter: &NameFilter) -> Result<Vec<Publisher>> {
        let clause = WhereClause::new().contains("name", filter.name.as_deref());
        let sort = PublisherSortField::resolve(filter.sort_by.as_deref());
        self.rows.query(&clause, &order_by(sort, filter.order))
    }

    pub fn get(&self, id: i64) -> Result<Option<Publisher>> {
        self.rows.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Publisher>> {
        self.rows.find_by("name", &name)
    }

    pub fn create(&self, publisher: Publisher) -> Result<Publisher> {
        self.rows.create(publisher)
    }

    pub fn update(&self, publisher: &Publisher) -> Result<Publisher> {
        self.rows.update(publisher)
    }

    pub fn delete(&self, publisher: &Publisher) -> Result<bool> {
        self.rows.delete(publisher)
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        self.rows.exists(id)
    }
}
