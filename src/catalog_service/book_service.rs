use super::error::{CatalogError, CatalogResult};
use super::payloads::{BookPatch, NewBook};
use super::validation::{ensure_reference, require_authors};
use crate::catalog_store::{
    AuthorRepository, BookFilter, BookRepository, GenreRepository, PublisherRepository,
    ResolvedBook, Session,
};
use tracing::{debug, info};

/// Book rules: references to genre, publisher and authors must resolve before
/// anything is written.
pub struct BookService<'c> {
    books: BookRepository<'c>,
    authors: AuthorRepository<'c>,
    genres: GenreRepository<'c>,
    publishers: PublisherRepository<'c>,
}

impl<'c> BookService<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        BookService {
            books: BookRepository::new(session),
            authors: AuthorRepository::new(session),
            genres: GenreRepository::new(session),
            publishers: PublisherRepository::new(session),
        }
    }

    fn check_genre(&self, genre_id: Option<i64>) -> CatalogResult<()> {
        match genre_id {
            Some(id) => ensure_reference("Genre", id, self.genres.exists(id)?),
            None => Ok(()),
        }
    }

    fn check_publisher(&self, publisher_id: Option<i64>) -> CatalogResult<()> {
        match publisher_id {
            Some(id) => ensure_reference("Publisher", id, self.publishers.exists(id)?),
            None => Ok(()),
        }
    }

    /// Non-empty, and every id resolves. Reports the first missing author.
    fn check_authors(&self, author_ids: &[i64]) -> CatalogResult<()> {
        require_authors(author_ids)?;
        for &author_id in author_ids {
            ensure_reference("Author", author_id, self.authors.exists(author_id)?)?;
        }
        Ok(())
    }

    pub fn list(&self, filter: &BookFilter) -> CatalogResult<Vec<ResolvedBook>> {
        debug!("Listing books with {:?}", filter);
        Ok(self.books.list_filtered(filter)?)
    }

    pub fn get(&self, id: i64) -> CatalogResult<ResolvedBook> {
        self.books
            .get(id)?
            .ok_or_else(|| CatalogError::not_found("Book", id))
    }

    pub fn create(&self, payload: NewBook) -> CatalogResult<ResolvedBook> {
        let (book, author_ids) = payload.into_parts()?;

        self.check_genre(book.genre_id)?;
        self.check_publisher(book.publisher_id)?;
        self.check_authors(&author_ids)?;

        let created = self.books.create(book, &author_ids)?;
        info!(
            "Created book {} ({}) with {} author(s)",
            created.book.id,
            created.book.title,
            created.authors.len()
        );
        Ok(created)
    }

    /// Applies `patch` to an existing book.
    ///
    /// Genre and publisher are checked only when the patch sets them to a
    /// value; an explicit null clears the reference. A supplied author list
    /// replaces the current one and must satisfy the same rules as on create.
    pub fn update(&self, id: i64, patch: BookPatch) -> CatalogResult<ResolvedBook> {
        let mut book = self.get(id)?.book;

        if let Some(genre_id) = patch.genre_id {
            self.check_genre(genre_id)?;
        }
        if let Some(publisher_id) = patch.publisher_id {
            self.check_publisher(publisher_id)?;
        }
        if let Some(author_ids) = &patch.author_ids {
            self.check_authors(author_ids)?;
        }

        patch.apply_to(&mut book)?;
        self.books.update(&book)?;

        if let Some(author_ids) = &patch.author_ids {
            self.books.replace_authors(id, author_ids)?;
        }
        debug!("Updated book {}", id);

        self.get(id)
    }

    /// Deletes the book and its author links. Books have no dependents.
    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        let existing = self.get(id)?;
        self.books.delete(&existing.book)?;
        info!("Deleted book {} ({})", id, existing.book.title);
        Ok(())
    }
}
