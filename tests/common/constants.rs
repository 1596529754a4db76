//! Shared constants for end-to-end tests
//!
//! When the seeded catalog changes, update only this file and the fixture
//! that inserts it.

// ============================================================================
// Genres
// ============================================================================

pub const GENRE_MYSTERY: &str = "Mystery";

pub const GENRE_HORROR: &str = "Horror";

// ============================================================================
// Publishers
// ============================================================================

pub const PUBLISHER_ACME: &str = "Acme";

pub const PUBLISHER_ACME_FOUNDED: &str = "1926-04-01";

// ============================================================================
// Authors
// ============================================================================

pub const AUTHOR_CHRISTIE: (&str, &str) = ("Agatha", "Christie");

pub const AUTHOR_DOYLE: (&str, &str) = ("Arthur", "Conan Doyle");

pub const AUTHOR_KING: (&str, &str) = ("Stephen", "King");

// ============================================================================
// Books
// ============================================================================

pub const BOOK_CASE_FILES: &str = "Case Files";
