//! Input payloads for creating and patching catalog entities.
//!
//! Patch fields follow a three-state convention: a missing field (`None`) is
//! left untouched, an explicit JSON `null` on a nullable field (`Some(None)`)
//! clears it, and a value (`Some(Some(v))`) replaces it.

use super::error::CatalogResult;
use super::validation::{optional_text, require_text};
use crate::catalog_store::{Author, Book, Genre, Publisher};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Makes a present-but-null field deserialize to `Some(None)` instead of
/// collapsing into `None`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// =============================================================================
// Authors
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub birthyear: Option<i32>,
}

impl NewAuthor {
    pub fn into_author(self) -> CatalogResult<Author> {
        Ok(Author {
            id: 0,
            name: require_text("name", &self.name)?,
            surname: require_text("surname", &self.surname)?,
            birthyear: self.birthyear,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub birthyear: Option<Option<i32>>,
}

impl AuthorPatch {
    pub fn apply_to(self, author: &mut Author) -> CatalogResult<()> {
        if let Some(name) = self.name {
            author.name = require_text("name", &name)?;
        }
        if let Some(surname) = self.surname {
            author.surname = require_text("surname", &surname)?;
        }
        if let Some(birthyear) = self.birthyear {
            author.birthyear = birthyear;
        }
        Ok(())
    }
}

// =============================================================================
// Genres
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewGenre {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewGenre {
    pub fn into_genre(self) -> CatalogResult<Genre> {
        Ok(Genre {
            id: 0,
            name: require_text("name", &self.name)?,
            description: optional_text(self.description),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenrePatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

impl GenrePatch {
    pub fn apply_to(self, genre: &mut Genre) -> CatalogResult<()> {
        if let Some(name) = self.name {
            genre.name = require_text("name", &name)?;
        }
        if let Some(description) = self.description {
            genre.description = optional_text(description);
        }
        Ok(())
    }
}

// =============================================================================
// Publishers
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewPublisher {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creation_date: Option<NaiveDate>,
}

impl NewPublisher {
    pub fn into_publisher(self) -> CatalogResult<Publisher> {
        Ok(Publisher {
            id: 0,
            name: require_text("name", &self.name)?,
            website: optional_text(self.website),
            description: optional_text(self.description),
            creation_date: self.creation_date,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublisherPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub website: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub creation_date: Option<Option<NaiveDate>>,
}

impl PublisherPatch {
    pub fn apply_to(self, publisher: &mut Publisher) -> CatalogResult<()> {
        if let Some(name) = self.name {
            publisher.name = require_text("name", &name)?;
        }
        if let Some(website) = self.website {
            publisher.website = optional_text(website);
        }
        if let Some(description) = self.description {
            publisher.description = optional_text(description);
        }
        if let Some(creation_date) = self.creation_date {
            publisher.creation_date = creation_date;
        }
        Ok(())
    }
}

// =============================================================================
// Books
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher_id: Option<i64>,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub author_ids: Vec<i64>,
}

impl NewBook {
    /// Splits the payload into the book row and its author ids.
    pub fn into_parts(self) -> CatalogResult<(Book, Vec<i64>)> {
        let book = Book {
            id: 0,
            title: require_text("title", &self.title)?,
            edition: optional_text(self.edition),
            published_date: self.published_date,
            isbn: optional_text(self.isbn),
            publisher_id: self.publisher_id,
            genre_id: self.genre_id,
        };
        Ok((book, self.author_ids))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub edition: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub published_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub isbn: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub publisher_id: Option<Option<i64>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub genre_id: Option<Option<i64>>,
    /// When present, replaces the whole author set.
    pub author_ids: Option<Vec<i64>>,
}

impl BookPatch {
    /// Applies the scalar fields. `author_ids` is handled separately since it
    /// lives in the association table.
    pub fn apply_to(&self, book: &mut Book) -> CatalogResult<()> {
        if let Some(title) = &self.title {
            book.title = require_text("title", title)?;
        }
        if let Some(edition) = &self.edition {
            book.edition = optional_text(edition.clone());
        }
        if let Some(published_date) = self.published_date {
            book.published_date = published_date;
        }
        if let Some(isbn) = &self.isbn {
            book.isbn = optional_text(isbn.clone());
        }
        if let Some(publisher_id) = self.publisher_id {
            book.publisher_id = publisher_id;
        }
        if let Some(genre_id) = self.genre_id {
            book.genre_id = genre_id;
        }
        Ok(())
    }
}
