use super::error::{CatalogError, CatalogResult};
use super::payloads::{AuthorPatch, NewAuthor};
use crate::catalog_store::{AuthorFilter, AuthorRepository, AuthorWithBooks, Session};
use tracing::{debug, info, warn};

pub struct AuthorService<'c> {
    authors: AuthorRepository<'c>,
}

impl<'c> AuthorService<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        AuthorService {
            authors: AuthorRepository::new(session),
        }
    }

    pub fn list(&self, filter: &AuthorFilter) -> CatalogResult<Vec<AuthorWithBooks>> {
        debug!("Listing authors with {:?}", filter);
        Ok(self.authors.list_filtered(filter)?)
    }

    pub fn get(&self, id: i64) -> CatalogResult<AuthorWithBooks> {
        self.authors
            .get(id)?
            .ok_or_else(|| CatalogError::not_found("Author", id))
    }

    pub fn create(&self, payload: NewAuthor) -> CatalogResult<AuthorWithBooks> {
        let created = self.authors.create(payload.into_author()?)?;
        info!(
            "Created author {} ({} {})",
            created.author.id, created.author.name, created.author.surname
        );
        Ok(created)
    }

    pub fn update(&self, id: i64, patch: AuthorPatch) -> CatalogResult<AuthorWithBooks> {
        let mut author = self.get(id)?.author;
        patch.apply_to(&mut author)?;
        debug!("Updating author {}", id);
        Ok(self.authors.update(&author)?)
    }

    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        let existing = self.get(id)?;
        if !existing.books.is_empty() {
            warn!(
                "Refusing to delete author {}: credited on {} book(s)",
                id,
                existing.books.len()
            );
            return Err(CatalogError::DeletionNotAllowed {
                entity: "Author",
                reason: "author has associated books. Remove book associations first.".to_string(),
                dependents: existing.books.len() as i64,
            });
        }

        self.authors.delete(&existing.author)?;
        info!("Deleted author {}", id);
        Ok(())
    }
}
