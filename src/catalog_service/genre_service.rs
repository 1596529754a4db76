use super::error::{CatalogError, CatalogResult};
use super::payloads::{GenrePatch, NewGenre};
use crate::catalog_store::{BookRepository, Genre, GenreRepository, NameFilter, Session};
use tracing::{debug, info, warn};

pub struct GenreService<'c> {
    genres: GenreRepository<'c>,
    books: BookRepository<'c>,
}

impl<'c> GenreService<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        GenreService {
            genres: GenreRepository::new(session),
            books: BookRepository::new(session),
        }
    }

    pub fn list(&self, filter: &NameFilter) -> CatalogResult<Vec<Genre>> {
        debug!("Listing genres with {:?}", filter);
        Ok(self.genres.list_filtered(filter)?)
    }

    pub fn get(&self, id: i64) -> CatalogResult<Genre> {
        self.genres
            .get(id)?
            .ok_or_else(|| CatalogError::not_found("Genre", id))
    }

    pub fn create(&self, payload: NewGenre) -> CatalogResult<Genre> {
        let created = self.genres.create(payload.into_genre()?)?;
        info!("Created genre {} ({})", created.id, created.name);
        Ok(created)
    }

    pub fn update(&self, id: i64, patch: GenrePatch) -> CatalogResult<Genre> {
        let mut genre = self.get(id)?;
        patch.apply_to(&mut genre)?;
        debug!("Updating genre {}", id);
        Ok(self.genres.update(&genre)?)
    }

    /// Deletes the genre unless books still reference it.
    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        let genre = self.get(id)?;

        let book_count = self.books.count_by_genre(id)?;
        if book_count > 0 {
            warn!("Refusing to delete genre {}: {} book(s) reference it", id, book_count);
            return Err(CatalogError::DeletionNotAllowed {
                entity: "Genre",
                reason: format!(
                    "genre has {} associated book(s). Reassign or delete books first.",
                    book_count
                ),
                dependents: book_count,
            });
        }

        self.genres.delete(&genre)?;
        info!("Deleted genre {} ({})", id, genre.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_service::ErrorKind;
    use crate::catalog_store::{SortOrder, SqliteCatalogStore};

    fn new_genre(name: &str) -> NewGenre {
        NewGenre {
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_create_get_update() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| -> CatalogResult<()> {
                let service = GenreService::new(s);
                let created = service.create(new_genre("Mystery"))?;
                assert_eq!(service.get(created.id)?, created);

                let updated = service.update(
                    created.id,
                    GenrePatch {
                        description: Some(Some("Whodunits".to_string())),
                        ..Default::default()
                    },
                )?;
                assert_eq!(updated.name, "Mystery");
                assert_eq!(updated.description.as_deref(), Some("Whodunits"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let err = store
            .session(|s| GenreService::new(s).create(new_genre("  ")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_name_is_a_store_error() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        store
            .session(|s| GenreService::new(s).create(new_genre("Mystery")))
            .unwrap();
        let err = store
            .session(|s| GenreService::new(s).create(new_genre("Mystery")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_delete_guarded_by_book_count() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let genre_id = store
            .session(|s| -> CatalogResult<i64> {
                let genre = GenreService::new(s).create(new_genre("Mystery"))?;
                s.conn().execute_batch(&format!(
                    "INSERT INTO books (title, genre_id) VALUES ('Curtain', {id});
                     INSERT INTO books (title, genre_id) VALUES ('Sleeping Murder', {id});",
                    id = genre.id
                ))?;
                Ok(genre.id)
            })
            .unwrap();

        let err = store
            .session(|s| GenreService::new(s).delete(genre_id))
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DeletionNotAllowed { dependents: 2, .. }
        ));
        assert_eq!(
            err.to_string(),
            "Cannot delete Genre: genre has 2 associated book(s). Reassign or delete books first."
        );

        store
            .session(|s| -> CatalogResult<()> {
                s.conn().execute("DELETE FROM books", [])?;
                GenreService::new(s).delete(genre_id)
            })
            .unwrap();
        let err = store
            .session(|s| GenreService::new(s).get(genre_id))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_list_filters_case_insensitively() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let names: Vec<String> = store
            .session(|s| -> CatalogResult<Vec<Genre>> {
                let service = GenreService::new(s);
                service.create(new_genre("Mystery"))?;
                service.create(new_genre("Cosy Mystery"))?;
                service.create(new_genre("Horror"))?;
                service.list(&NameFilter {
                    name: Some("MYSTERY".to_string()),
                    sort_by: Some("unknown_field".to_string()),
                    order: SortOrder::Asc,
                })
            })
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Cosy Mystery", "Mystery"]);
    }
}
