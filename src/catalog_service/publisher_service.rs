use super::error::{CatalogError, CatalogResult};
use super::payloads::{NewPublisher, PublisherPatch};
use crate::catalog_store::{BookRepository, NameFilter, Publisher, PublisherRepository, Session};
use tracing::{debug, info, warn};

pub struct PublisherService<'c> {
    publishers: PublisherRepository<'c>,
    books: BookRepository<'c>,
}

impl<'c> PublisherService<'c> {
    pub fn new(session: &Session<'c>) -> Self {
        PublisherService {
            publishers: PublisherRepository::new(session),
            books: BookRepository::new(session),
        }
    }

    pub fn list(&self, filter: &NameFilter) -> CatalogResult<Vec<Publisher>> {
        debug!("Listing publishers with {:?}", filter);
        Ok(self.publishers.list_filtered(filter)?)
    }

    pub fn get(&self, id: i64) -> CatalogResult<Publisher> {
        self.publishers
            .get(id)?
            .ok_or_else(|| CatalogError::not_found("Publisher", id))
    }

    pub fn create(&self, payload: NewPublisher) -> CatalogResult<Publisher> {
        let created = self.publishers.create(payload.into_publisher()?)?;
        info!("Created publisher {} ({})", created.id, created.name);
        Ok(created)
    }

    pub fn update(&self, id: i64, patch: PublisherPatch) -> CatalogResult<Publisher> {
        let mut publisher = self.get(id)?;
        patch.apply_to(&mut publisher)?;
        debug!("Updating publisher {}", id);
        Ok(self.publishers.update(&publisher)?)
    }

    /// Deletes the publisher unless books still reference it.
    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        let publisher = self.get(id)?;

        let book_count = self.books.count_by_publisher(id)?;
        if book_count > 0 {
            warn!(
                "Refusing to delete publisher {}: {} book(s) reference it",
                id, book_count
            );
            return Err(CatalogError::DeletionNotAllowed {
                entity: "Publisher",
                reason: format!(
                    "publisher has {} associated book(s). Reassign or delete books first.",
                    book_count
                ),
                dependents: book_count,
            });
        }

        self.publishers.delete(&publisher)?;
        info!("Deleted publisher {} ({})", id, publisher.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_service::ErrorKind;
    use crate::catalog_store::SqliteCatalogStore;
    use chrono::NaiveDate;

    fn new_publisher(name: &str) -> NewPublisher {
        NewPublisher {
            name: name.to_string(),
            website: Some("https://example.org".to_string()),
            description: None,
            creation_date: NaiveDate::from_ymd_opt(1926, 4, 1),
        }
    }

    #[test]
    fn test_get_after_create() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let created = store
            .session(|s| PublisherService::new(s).create(new_publisher("Acme")))
            .unwrap();
        let fetched = store
            .session(|s| PublisherService::new(s).get(created.id))
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_update_explicit_null_clears_field() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let updated = store
            .session(|s| -> CatalogResult<Publisher> {
                let service = PublisherService::new(s);
                let created = service.create(new_publisher("Acme"))?;
                let patch: PublisherPatch =
                    serde_json::from_str(r#"{"website": null}"#).map_err(anyhow::Error::from)?;
                service.update(created.id, patch)
            })
            .unwrap();

        assert_eq!(updated.website, None);
        assert_eq!(updated.creation_date, NaiveDate::from_ymd_opt(1926, 4, 1));
    }

    #[test]
    fn test_delete_guarded_by_book_count() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let publisher_id = store
            .session(|s| -> CatalogResult<i64> {
                let publisher = PublisherService::new(s).create(new_publisher("Acme"))?;
                s.conn().execute(
                    "INSERT INTO books (title, publisher_id) VALUES ('Case Files', ?1)",
                    rusqlite::params![publisher.id],
                )?;
                Ok(publisher.id)
            })
            .unwrap();

        let err = store
            .session(|s| PublisherService::new(s).delete(publisher_id))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeletionNotAllowed);
        assert_eq!(
            err.to_string(),
            "Cannot delete Publisher: publisher has 1 associated book(s). Reassign or delete books first."
        );

        // Still present after the refused delete.
        store
            .session(|s| PublisherService::new(s).get(publisher_id))
            .unwrap();
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = SqliteCatalogStore::in_memory().unwrap();
        let err = store
            .session(|s| PublisherService::new(s).delete(12))
            .unwrap_err();
        assert_eq!(err.to_string(), "Publisher with id 12 not found");
        assert_eq!(err.status_code(), 404);
    }
}
