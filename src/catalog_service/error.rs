use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by catalog business rules.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Cannot delete {entity}: {reason}")]
    DeletionNotAllowed {
        entity: &'static str,
        reason: String,
        dependents: i64,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Store(e.into())
    }
}

/// Machine-checkable category of a [`CatalogError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    DeletionNotAllowed,
    Validation,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::DeletionNotAllowed => "deletion_not_allowed",
            ErrorKind::Validation => "validation",
            ErrorKind::Store => "store",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CatalogError::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::DeletionNotAllowed { .. } => ErrorKind::DeletionNotAllowed,
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::Store(_) => ErrorKind::Store,
        }
    }

    /// HTTP-style status a boundary should report for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::DeletionNotAllowed | ErrorKind::Validation => 400,
            ErrorKind::Store => 500,
        }
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
