mod author_repository;
mod book_repository;
mod genre_repository;
mod models;
mod publisher_repository;
mod query;
mod repository;
mod schema;
mod session;
mod store;

pub use author_repository::AuthorRepository;
pub use book_repository::BookRepository;
pub use genre_repository::GenreRepository;
pub use models::*;
pub use publisher_repository::PublisherRepository;
pub use query::{
    AuthorFilter, AuthorSortField, BookFilter, BookSortField, GenreSortField, NameFilter,
    PublisherSortField, SortField, SortOrder,
};
pub use repository::{Entity, Repository};
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use session::Session;
pub use store::SqliteCatalogStore;
