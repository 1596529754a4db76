//! SQLite schema definitions for the book catalog database.
//!
//! Genres and publishers are referenced from books through nullable foreign
//! keys. Authors are linked to books through the `book_authors` association
//! table, one row per (book, author) pair.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema};

// =============================================================================
// Foreign Keys
// =============================================================================

const BOOK_GENRE_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

const BOOK_PUBLISHER_FK: ForeignKey = ForeignKey {
    foreign_table: "publishers",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

const BOOK_AUTHORS_BOOK_FK: ForeignKey = ForeignKey {
    foreign_table: "books",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const BOOK_AUTHORS_AUTHOR_FK: ForeignKey = ForeignKey {
    foreign_table: "authors",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

// =============================================================================
// Core Tables
// =============================================================================

const AUTHORS_TABLE: Table = Table {
    name: "authors",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("surname", &SqlType::Text, non_null = true),
        sqlite_column!("birthyear", &SqlType::Integer),
    ],
    indices: &[("idx_authors_name", "name")],
    unique_constraints: &[],
};

const PUBLISHERS_TABLE: Table = Table {
    name: "publishers",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("website", &SqlType::Text),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("creation_date", &SqlType::Text), // 'YYYY-MM-DD'
    ],
    indices: &[],
    unique_constraints: &[],
};

const GENRES_TABLE: Table = Table {
    name: "genres",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("description", &SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[],
};

const BOOKS_TABLE: Table = Table {
    name: "books",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("edition", &SqlType::Text),
        sqlite_column!("published_date", &SqlType::Text), // 'YYYY-MM-DD'
        sqlite_column!("isbn", &SqlType::Text),
        sqlite_column!(
            "publisher_id",
            &SqlType::Integer,
            foreign_key = Some(&BOOK_PUBLISHER_FK)
        ),
        sqlite_column!(
            "genre_id",
            &SqlType::Integer,
            foreign_key = Some(&BOOK_GENRE_FK)
        ),
    ],
    indices: &[
        ("idx_books_publisher", "publisher_id"),
        ("idx_books_genre", "genre_id"),
        ("idx_books_isbn", "isbn"),
    ],
    unique_constraints: &[],
};

// =============================================================================
// Association Tables
// =============================================================================

/// Book <-> Author relationship
const BOOK_AUTHORS_TABLE: Table = Table {
    name: "book_authors",
    columns: &[
        sqlite_column!(
            "book_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BOOK_AUTHORS_BOOK_FK)
        ),
        sqlite_column!(
            "author_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BOOK_AUTHORS_AUTHOR_FK)
        ),
    ],
    indices: &[("idx_book_authors_author", "author_id")],
    unique_constraints: &[&["book_id", "author_id"]],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        AUTHORS_TABLE,
        PUBLISHERS_TABLE,
        GENRES_TABLE,
        BOOKS_TABLE,
        BOOK_AUTHORS_TABLE,
    ],
    migration: None,
}];
