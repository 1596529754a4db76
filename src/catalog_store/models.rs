//! Catalog entity models.
//!
//! Plain row types (`Author`, `Book`, `Genre`, `Publisher`) mirror the SQLite
//! tables one to one. Summaries and resolved types carry the eagerly loaded
//! relations handed back to callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Core Entities
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub birthyear: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub website: Option<String>,
    pub description: Option<String>,
    /// Founding date of the publishing house.
    pub creation_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// Free-form edition label, e.g. "2nd" or "Collector's".
    pub edition: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub publisher_id: Option<i64>,
    pub genre_id: Option<i64>,
}

// =============================================================================
// Summaries
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub name: String,
    pub surname: String,
}

impl From<&Author> for AuthorSummary {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            name: author.name.clone(),
            surname: author.surname.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherSummary {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Resolved/Composite Types
// =============================================================================

/// An author together with the books they are credited on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookSummary>,
}

/// A book with its authors, genre and publisher resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBook {
    #[serde(flatten)]
    pub book: Book,
    pub authors: Vec<AuthorSummary>,
    pub publisher: Option<PublisherSummary>,
    pub genre: Option<GenreSummary>,
}

impl ResolvedBook {
    pub fn author_ids(&self) -> Vec<i64> {
        self.authors.iter().map(|a| a.id).collect()
    }
}
