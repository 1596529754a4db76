//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestCatalog;
//!
//! #[test]
//! fn test_something() {
//!     let (catalog, ids) = TestCatalog::seeded().unwrap();
//!     // catalog.store.session(|s| ...)
//! }
//! ```

mod constants;
mod fixtures;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
pub use fixtures::{SeededIds, TestCatalog};
