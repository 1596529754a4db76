use super::models::{AuthorSummary, Book, GenreSummary, PublisherSummary, ResolvedBook};
use super::query::{order_by, BookFilter, BookSortField, SortField, WhereClause};
use super::repository::{Entity, Repository};
use super::session::Session;
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row, ToSql};
use std::collections::HashSet;
use tracing::debug;

const BOOKS_BY_AUTHOR: &str = "id IN (SELECT book_id FROM book_authors WHERE author_id = {})";

impl Entity for Book {
    const TABLE: &'static str = "books";
    const KIND: &'static str = "Book";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "edition",
        "published_date",
        "isbn",
        "publisher_id",
        "genre_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            edition: row.get(2)?,
            published_date: row.get(3)?,
            isbn: row.get(4)?,
            publisher_id: row.get(5)?,
            genre_id: row.get(6)?,
        })
    }

    fn column_values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.title,
            &self.edition,
            &self.published_date,
            &self.isbn,
            &self.publisher_id,
            &self.genre_id,
        ]
    }
}

/// Book rows, resolved with their authors, genre and publisher.
pub struct BookRepository<'c> {
    rows: Repository<'c, Book>,
}

impl<'c> BookRepository<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        BookRepository {
            rows: Repository::new(session),
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn authors_of(&self, book_id: i64) -> Result<Vec<AuthorSummary>> {
        let mut stmt = self.rows.conn().prepare_cached(
            "SELECT a.id, a.name, a.surname
             FROM authors a
             INNER JOIN book_authors ba ON a.id = ba.author_id
             WHERE ba.book_id = ?1
             ORDER BY ba.rowid",
        )?;
        let authors = stmt
            .query_map(params![book_id], |row| {
                Ok(AuthorSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    surname: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(authors)
    }

    fn genre_summary(&self, genre_id: Option<i64>) -> Result<Option<GenreSummary>> {
        let Some(genre_id) = genre_id else {
            return Ok(None);
        };
        let mut stmt = self
            .rows
            .conn()
            .prepare_cached("SELECT id, name FROM genres WHERE id = ?1")?;
        let genre = stmt
            .query_row(params![genre_id], |row| {
                Ok(GenreSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?;
        Ok(genre)
    }

    fn publisher_summary(&self, publisher_id: Option<i64>) -> Result<Option<PublisherSummary>> {
        let Some(publisher_id) = publisher_id else {
            return Ok(None);
        };
        let mut stmt = self
            .rows
            .conn()
            .prepare_cached("SELECT id, name FROM publishers WHERE id = ?1")?;
        let publisher = stmt
            .query_row(params![publisher_id], |row| {
                Ok(PublisherSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?;
        Ok(publisher)
    }

    fn resolve(&self, book: Book) -> Result<ResolvedBook> {
        let authors = self.authors_of(book.id)?;
        let genre = self.genre_summary(book.genre_id)?;
        let publisher = self.publisher_summary(book.publisher_id)?;
        Ok(ResolvedBook {
            book,
            authors,
            publisher,
            genre,
        })
    }

    fn resolve_all(&self, books: Vec<Book>) -> Result<Vec<ResolvedBook>> {
        books.into_iter().map(|b| self.resolve(b)).collect()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn list(&self) -> Result<Vec<ResolvedBook>> {
        let books = self.rows.list("id ASC")?;
        self.resolve_all(books)
    }

    pub fn list_filtered(&self, filter: &BookFilter) -> Result<Vec<ResolvedBook>> {
        let clause = WhereClause::new()
            .contains("title", filter.title.as_deref())
            .equals("genre_id", filter.genre_id)
            .equals("publisher_id", filter.publisher_id)
            .condition(BOOKS_BY_AUTHOR, filter.author_id);
        let sort = BookSortField::resolve(filter.sort_by.as_deref());
        let books = self.rows.query(&clause, &order_by(sort, filter.order))?;
        self.resolve_all(books)
    }

    pub fn get(&self, id: i64) -> Result<Option<ResolvedBook>> {
        match self.rows.get(id)? {
            Some(book) => Ok(Some(self.resolve(book)?)),
            None => Ok(None),
        }
    }

    pub fn by_author(&self, author_id: i64) -> Result<Vec<ResolvedBook>> {
        let clause = WhereClause::new().condition(BOOKS_BY_AUTHOR, Some(author_id));
        let books = self.rows.query(&clause, "id ASC")?;
        self.resolve_all(books)
    }

    pub fn by_genre(&self, genre_id: i64) -> Result<Vec<ResolvedBook>> {
        let books = self.rows.all_by("genre_id", genre_id)?;
        self.resolve_all(books)
    }

    pub fn by_publisher(&self, publisher_id: i64) -> Result<Vec<ResolvedBook>> {
        let books = self.rows.all_by("publisher_id", publisher_id)?;
        self.resolve_all(books)
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        self.rows.find_by("isbn", &isbn)
    }

    pub fn count_by_genre(&self, genre_id: i64) -> Result<i64> {
        self.rows.count_where("genre_id", genre_id)
    }

    pub fn count_by_publisher(&self, publisher_id: i64) -> Result<i64> {
        self.rows.count_where("publisher_id", publisher_id)
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        self.rows.exists(id)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts the book and one association row per author.
    pub fn create(&self, book: Book, author_ids: &[i64]) -> Result<ResolvedBook> {
        let created = self.rows.create(book)?;
        self.replace_authors(created.id, author_ids)?;
        self.resolve(created)
    }

    /// Persists the scalar columns of `book`. The author set is left alone.
    pub fn update(&self, book: &Book) -> Result<ResolvedBook> {
        let updated = self.rows.update(book)?;
        self.resolve(updated)
    }

    /// Drops every association row of the book and inserts `author_ids` in
    /// their given order. Repeated ids are linked once.
    pub fn replace_authors(&self, book_id: i64, author_ids: &[i64]) -> Result<()> {
        let conn = self.rows.conn();
        conn.execute(
            "DELETE FROM book_authors WHERE book_id = ?1",
            params![book_id],
        )?;

        let mut stmt =
            conn.prepare_cached("INSERT INTO book_authors (book_id, author_id) VALUES (?1, ?2)")?;
        let mut seen = HashSet::new();
        for author_id in author_ids.iter().filter(|id| seen.insert(**id)) {
            stmt.execute(params![book_id, author_id])?;
        }
        debug!("Book {} now has {} author(s)", book_id, seen.len());
        Ok(())
    }

    /// Removes the book together with its association rows.
    pub fn delete(&self, book: &Book) -> Result<bool> {
        self.rows.conn().execute(
            "DELETE FROM book_authors WHERE book_id = ?1",
            params![book.id],
        )?;
        self.rows.delete(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::query::SortOrder;
    use crate::catalog_store::SqliteCatalogStore;
    use chrono::NaiveDate;

    fn seed(session: &Session<'_>) -> Result<()> {
        session.conn().execute_batch(
            "INSERT INTO authors (id, name, surname) VALUES (1, 'Agatha', 'Christie');
             INSERT INTO authors (id, name, surname) VALUES (2, 'Arthur', 'Conan Doyle');
             INSERT INTO genres (id, name) VALUES (1, 'Mystery');
             INSERT INTO publishers (id, name) VALUES (1, 'Acme');",
        )?;
        Ok(())
    }

    fn book(title: &str, genre_id: Option<i64>, publisher_id: Option<i64>) -> Book {
        Book {
            id: 0,
            title: title.to_string(),
            edition: None,
            published_date: None,
            isbn: None,
            publisher_id,
            genre_id,
        }
    }

    #[test]
    fn test_create_resolves_relations() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| -> Result<()> {
                seed(s)?;
                let repo = BookRepository::new(s);
                let created = repo.create(book("Case Files", Some(1), Some(1)), &[2, 1])?;

                assert_eq!(created.author_ids(), vec![2, 1]);
                assert_eq!(created.genre.as_ref().map(|g| g.name.as_str()), Some("Mystery"));
                assert_eq!(
                    created.publisher.as_ref().map(|p| p.name.as_str()),
                    Some("Acme")
                );
                assert_eq!(repo.get(created.book.id)?, Some(created));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_replace_authors_swaps_whole_set() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| -> Result<()> {
                seed(s)?;
                let repo = BookRepository::new(s);
                let created = repo.create(book("Case Files", None, None), &[1])?;

                repo.replace_authors(created.book.id, &[2, 2])?;
                let fetched = repo.get(created.book.id)?.unwrap();
                assert_eq!(fetched.author_ids(), vec![2]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_counts_and_reference_lookups() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| -> Result<()> {
                seed(s)?;
                let repo = BookRepository::new(s);
                repo.create(book("Curtain", Some(1), None), &[1])?;
                repo.create(book("A Study in Scarlet", Some(1), Some(1)), &[2])?;
                repo.create(book("Untitled", None, None), &[1, 2])?;

                assert_eq!(repo.count_by_genre(1)?, 2);
                assert_eq!(repo.count_by_publisher(1)?, 1);
                assert_eq!(repo.count_by_genre(99)?, 0);

                let by_agatha: Vec<String> = repo
                    .by_author(1)?
                    .into_iter()
                    .map(|b| b.book.title)
                    .collect();
                assert_eq!(by_agatha, vec!["Curtain", "Untitled"]);
                assert_eq!(repo.by_genre(1)?.len(), 2);
                assert_eq!(repo.by_publisher(1)?.len(), 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_find_by_isbn() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| -> Result<()> {
                seed(s)?;
                let repo = BookRepository::new(s);
                let mut with_isbn = book("Curtain", None, None);
                with_isbn.isbn = Some("978-0-00-712083-2".to_string());
                let created = repo.create(with_isbn, &[1])?;

                assert_eq!(
                    repo.find_by_isbn("978-0-00-712083-2")?,
                    Some(created.book)
                );
                assert_eq!(repo.find_by_isbn("978")?, None);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_list_filtered() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| -> Result<()> {
                seed(s)?;
                let repo = BookRepository::new(s);
                let mut early = book("The Sign of the Four", Some(1), None);
                early.published_date = NaiveDate::from_ymd_opt(1890, 2, 1);
                let mut later = book("The Hound of the Baskervilles", Some(1), Some(1));
                later.published_date = NaiveDate::from_ymd_opt(1902, 4, 1);
                repo.create(early, &[2])?;
                repo.create(later, &[2])?;
                repo.create(book("Curtain", None, None), &[1])?;

                let filter = BookFilter {
                    title: Some("THE".to_string()),
                    author_id: Some(2),
                    sort_by: Some("published_date".to_string()),
                    order: SortOrder::Desc,
                    ..Default::default()
                };
                let titles: Vec<String> = repo
                    .list_filtered(&filter)?
                    .into_iter()
                    .map(|b| b.book.title)
                    .collect();
                assert_eq!(
                    titles,
                    vec!["The Hound of the Baskervilles", "The Sign of the Four"]
                );

                let filter = BookFilter {
                    publisher_id: Some(1),
                    ..Default::default()
                };
                assert_eq!(repo.list_filtered(&filter)?.len(), 1);

                let filter = BookFilter {
                    sort_by: Some("popularity".to_string()),
                    ..Default::default()
                };
                let titles: Vec<String> = repo
                    .list_filtered(&filter)?
                    .into_iter()
                    .map(|b| b.book.title)
                    .collect();
                assert_eq!(
                    titles,
                    vec![
                        "Curtain",
                        "The Hound of the Baskervilles",
                        "The Sign of the Four"
                    ]
                );
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_delete_removes_association_rows() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| -> Result<()> {
                seed(s)?;
                let repo = BookRepository::new(s);
                let created = repo.create(book("Curtain", None, None), &[1, 2])?;

                assert!(repo.delete(&created.book)?);
                assert!(!repo.exists(created.book.id)?);
                let links: i64 =
                    s.conn()
                        .query_row("SELECT COUNT(*) FROM book_authors", [], |r| r.get(0))?;
                assert_eq!(links, 0);
                Ok(())
            })
            .unwrap();
    }
}
