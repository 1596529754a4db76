//! Test fixture creation for the catalog database

#![allow(dead_code)]

use super::constants::*;
use anyhow::Result;
use book_catalog::catalog_service::{
    AuthorService, GenreService, NewAuthor, NewGenre, NewPublisher, PublisherService,
};
use book_catalog::{CatalogResult, SqliteCatalogStore};
use std::path::PathBuf;
use tempfile::TempDir;

/// Ids of the records inserted by [`TestCatalog::seeded`].
#[derive(Debug, Clone, Copy)]
pub struct SeededIds {
    pub mystery: i64,
    pub horror: i64,
    pub acme: i64,
    pub christie: i64,
    pub doyle: i64,
    pub king: i64,
}

/// A file-backed catalog living in its own temporary directory.
pub struct TestCatalog {
    pub store: SqliteCatalogStore,
    pub db_path: PathBuf,
    // Dropped last: removes the database file.
    _dir: TempDir,
}

impl TestCatalog {
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("catalog.db");
        let store = SqliteCatalogStore::new(&db_path)?;
        Ok(TestCatalog {
            store,
            db_path,
            _dir: dir,
        })
    }

    /// Two genres, one publisher and three authors, no books.
    pub fn seeded() -> Result<(Self, SeededIds)> {
        let catalog = Self::empty()?;
        let ids = catalog.store.session(|s| -> CatalogResult<SeededIds> {
            let genres = GenreService::new(s);
            let publishers = PublisherService::new(s);
            let authors = AuthorService::new(s);

            let author = |(name, surname): (&str, &str)| NewAuthor {
                name: name.to_string(),
                surname: surname.to_string(),
                birthyear: None,
            };

            Ok(SeededIds {
                mystery: genres.create(genre(GENRE_MYSTERY))?.id,
                horror: genres.create(genre(GENRE_HORROR))?.id,
                acme: publishers
                    .create(NewPublisher {
                        name: PUBLISHER_ACME.to_string(),
                        website: None,
                        description: None,
                        creation_date: PUBLISHER_ACME_FOUNDED.parse().ok(),
                    })?
                    .id,
                christie: authors.create(author(AUTHOR_CHRISTIE))?.author.id,
                doyle: authors.create(author(AUTHOR_DOYLE))?.author.id,
                king: authors.create(author(AUTHOR_KING))?.author.id,
            })
        })?;
        Ok((catalog, ids))
    }

    /// Reopens the same database file with a fresh store.
    pub fn reopen(&self) -> Result<SqliteCatalogStore> {
        SqliteCatalogStore::new(&self.db_path)
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        self.store
            .session(|s| {
                s.conn()
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            })
            .unwrap()
    }
}

fn genre(name: &str) -> NewGenre {
    NewGenre {
        name: name.to_string(),
        description: None,
    }
}
