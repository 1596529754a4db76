use super::models::{Author, AuthorWithBooks, BookSummary};
use super::query::{order_by, AuthorFilter, AuthorSortField, SortField, WhereClause};
use super::repository::{Entity, Repository};
use super::session::Session;
use anyhow::Result;
use rusqlite::{params, Row, ToSql};

impl Entity for Author {
    const TABLE: &'static str = "authors";
    const KIND: &'static str = "Author";
    const COLUMNS: &'static [&'static str] = &["name", "surname", "birthyear"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Author {
            id: row.get(0)?,
            name: row.get(1)?,
            surname: row.get(2)?,
            birthyear: row.get(3)?,
        })
    }

    fn column_values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name, &self.surname, &self.birthyear]
    }
}

/// Author rows, always handed out with the books they are credited on.
pub struct AuthorRepository<'c> {
    rows: Repository<'c, Author>,
}

impl<'c> AuthorRepository<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        AuthorRepository {
            rows: Repository::new(session),
        }
    }

    fn books_of(&self, author_id: i64) -> Result<Vec<BookSummary>> {
        let mut stmt = self.rows.conn().prepare_cached(
            "SELECT b.id, b.title
             FROM books b
             INNER JOIN book_authors ba ON b.id = ba.book_id
             WHERE ba.author_id = ?1
             ORDER BY b.title COLLATE UNICODE_NOCASE, b.id",
        )?;
        let books = stmt
            .query_map(params![author_id], |row| {
                Ok(BookSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn with_books(&self, author: Author) -> Result<AuthorWithBooks> {
        let books = self.books_of(author.id)?;
        Ok(AuthorWithBooks { author, books })
    }

    fn resolve_all(&self, authors: Vec<Author>) -> Result<Vec<AuthorWithBooks>> {
        authors.into_iter().map(|a| self.with_books(a)).collect()
    }

    pub fn list(&self) -> Result<Vec<AuthorWithBooks>> {
        let authors = self.rows.list("id ASC")?;
        self.resolve_all(authors)
    }

    pub fn list_filtered(&self, filter: &AuthorFilter) -> Result<Vec<AuthorWithBooks>> {
        let clause = WhereClause::new()
            .contains("name", filter.name.as_deref())
            .contains("surname", filter.surname.as_deref());
        let sort = AuthorSortField::resolve(filter.sort_by.as_deref());
        let authors = self.rows.query(&clause, &order_by(sort, filter.order))?;
        self.resolve_all(authors)
    }

    pub fn get(&self, id: i64) -> Result<Option<AuthorWithBooks>> {
        match self.rows.get(id)? {
            Some(author) => Ok(Some(self.with_books(author)?)),
            None => Ok(None),
        }
    }

    /// First author whose first name matches `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Author>> {
        self.rows.find_by("name", &name)
    }

    pub fn create(&self, author: Author) -> Result<AuthorWithBooks> {
        let created = self.rows.create(author)?;
        self.with_books(created)
    }

    pub fn update(&self, author: &Author) -> Result<AuthorWithBooks> {
        let updated = self.rows.update(author)?;
        self.with_books(updated)
    }

    pub fn delete(&self, author: &Author) -> Result<bool> {
        self.rows.delete(author)
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        self.rows.exists(id)
    }
}
