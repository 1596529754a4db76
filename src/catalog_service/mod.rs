//! Business rules layered over the catalog store.
//!
//! Every service is built from a [`Session`](crate::catalog_store::Session),
//! so all calls made through it share one transaction.

mod author_service;
mod book_service;
mod error;
mod genre_service;
mod payloads;
mod publisher_service;
mod validation;

pub use author_service::AuthorService;
pub use book_service::BookService;
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use genre_service::GenreService;
pub use payloads::{
    AuthorPatch, BookPatch, GenrePatch, NewAuthor, NewBook, NewGenre, NewPublisher,
    PublisherPatch,
};
pub use publisher_service::PublisherService;
pub use validation::{ensure_reference, optional_text, require_authors, require_text};
