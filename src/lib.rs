//! Book Catalog Library
//!
//! SQLite-backed catalog of authors, books, genres and publishers, with the
//! business rules that guard references between them.

pub mod catalog_service;
pub mod catalog_store;
pub mod config;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_service::{CatalogError, CatalogResult, ErrorKind};
pub use catalog_store::{Session, SqliteCatalogStore};
