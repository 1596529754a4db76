//! Checks shared by the per-entity business rules.

use super::error::{CatalogError, CatalogResult};

/// Rejects a required text field that is empty after trimming. Returns the
/// trimmed value.
pub fn require_text(field: &str, value: &str) -> CatalogResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Maps a missing referenced row to a validation error naming it.
pub fn ensure_reference(kind: &str, id: i64, exists: bool) -> CatalogResult<()> {
    if exists {
        Ok(())
    } else {
        Err(CatalogError::Validation(format!(
            "{} with id {} not found",
            kind, id
        )))
    }
}

pub fn require_authors(author_ids: &[i64]) -> CatalogResult<()> {
    if author_ids.is_empty() {
        return Err(CatalogError::Validation(
            "at least one author required".to_string(),
        ));
    }
    Ok(())
}

/// Trims optional text; blank strings become `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
