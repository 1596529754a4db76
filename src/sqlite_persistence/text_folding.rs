//! Unicode-aware case folding for SQLite connections.
//!
//! SQLite's built-in `lower()` and `NOCASE` only fold ASCII letters.
//! [`register_text_folding`] installs replacements that fold the full Unicode
//! range:
//!
//! - `unicode_lower(text)`: scalar function, `NULL` in gives `NULL` out.
//! - `UNICODE_NOCASE`: collation comparing the lowercased forms.

use anyhow::{Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

pub const UNICODE_LOWER: &str = "unicode_lower";
pub const UNICODE_NOCASE: &str = "UNICODE_NOCASE";

/// Must run on every connection before any statement that uses the function
/// or the collation is prepared.
pub fn register_text_folding(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
    .with_context(|| format!("Failed to register {} function", UNICODE_LOWER))?;

    conn.create_collation(UNICODE_NOCASE, |a: &str, b: &str| {
        a.to_lowercase().cmp(&b.to_lowercase())
    })
    .with_context(|| format!("Failed to register {} collation", UNICODE_NOCASE))?;

    Ok(())
}
