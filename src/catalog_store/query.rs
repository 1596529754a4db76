//! Filtering and sorting criteria for catalog listings.
//!
//! Sort fields arrive as free-form strings from the boundary. Each entity maps
//! the names it understands onto a whitelisted column; anything else resolves
//! to the entity's default field.

use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => anyhow::bail!("Unknown sort order '{}'", other),
        }
    }
}

/// A sortable column of one entity table.
pub trait SortField: Copy + Default {
    /// Column expression used in `ORDER BY`.
    fn column(&self) -> &'static str;

    fn parse(name: &str) -> Option<Self>;

    /// Resolves a caller-supplied field name, falling back to the default for
    /// unknown or missing names.
    fn resolve(name: Option<&str>) -> Self {
        name.and_then(|n| Self::parse(&n.trim().to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthorSortField {
    Id,
    Name,
    #[default]
    Surname,
    Birthyear,
}

impl SortField for AuthorSortField {
    fn column(&self) -> &'static str {
        match self {
            AuthorSortField::Id => "id",
            AuthorSortField::Name => "name COLLATE UNICODE_NOCASE",
            AuthorSortField::Surname => "surname COLLATE UNICODE_NOCASE",
            AuthorSortField::Birthyear => "birthyear",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(AuthorSortField::Id),
            "name" => Some(AuthorSortField::Name),
            "surname" => Some(AuthorSortField::Surname),
            "birthyear" | "birth_year" => Some(AuthorSortField::Birthyear),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GenreSortField {
    Id,
    #[default]
    Name,
}

impl SortField for GenreSortField {
    fn column(&self) -> &'static str {
        match self {
            GenreSortField::Id => "id",
            GenreSortField::Name => "name COLLATE UNICODE_NOCASE",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(GenreSortField::Id),
            "name" => Some(GenreSortField::Name),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PublisherSortField {
    Id,
    #[default]
    Name,
    CreationDate,
}

impl SortField for PublisherSortField {
    fn column(&self) -> &'static str {
        match self {
            PublisherSortField::Id => "id",
            PublisherSortField::Name => "name COLLATE UNICODE_NOCASE",
            PublisherSortField::CreationDate => "creation_date",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(PublisherSortField::Id),
            "name" => Some(PublisherSortField::Name),
            "creation_date" => Some(PublisherSortField::CreationDate),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BookSortField {
    Id,
    #[default]
    Title,
    Edition,
    PublishedDate,
}

impl SortField for BookSortField {
    fn column(&self) -> &'static str {
        match self {
            BookSortField::Id => "id",
            BookSortField::Title => "title COLLATE UNICODE_NOCASE",
            BookSortField::Edition => "edition COLLATE UNICODE_NOCASE",
            BookSortField::PublishedDate => "published_date",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(BookSortField::Id),
            "title" => Some(BookSortField::Title),
            "edition" => Some(BookSortField::Edition),
            "published_date" => Some(BookSortField::PublishedDate),
            _ => None,
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorFilter {
    /// Case-insensitive substring of the first name.
    pub name: Option<String>,
    /// Case-insensitive substring of the surname.
    pub surname: Option<String>,
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

/// Filter shared by genres and publishers, which only expose a name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameFilter {
    pub name: Option<String>,
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    pub genre_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub author_id: Option<i64>,
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

// =============================================================================
// SQL Building
// =============================================================================

/// Accumulates `WHERE` conditions together with their bound parameters.
#[derive(Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_placeholder(&self) -> String {
        format!("?{}", self.params.len() + 1)
    }

    /// Case-insensitive substring match on `column`. No-op when `needle` is
    /// absent.
    pub fn contains(mut self, column: &str, needle: Option<&str>) -> Self {
        if let Some(needle) = needle {
            let placeholder = self.next_placeholder();
            self.conditions.push(format!(
                "instr(unicode_lower({}), unicode_lower({})) > 0",
                column, placeholder
            ));
            self.params.push(Box::new(needle.to_string()));
        }
        self
    }

    /// Exact match on an integer column. No-op when `value` is absent.
    pub fn equals(mut self, column: &str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            let placeholder = self.next_placeholder();
            self.conditions
                .push(format!("{} = {}", column, placeholder));
            self.params.push(Box::new(value));
        }
        self
    }

    /// Arbitrary condition with a single `{}` slot for the placeholder.
    pub fn condition(mut self, template: &str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            let placeholder = self.next_placeholder();
            self.conditions.push(template.replace("{}", &placeholder));
            self.params.push(Box::new(value));
        }
        self
    }

    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// `ORDER BY` clause for `field`, with `id` as a tie breaker so listings are
/// deterministic.
pub fn order_by<F: SortField>(field: F, order: SortOrder) -> String {
    format!("{} {}, id ASC", field.column(), order.as_sql())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sort_field_falls_back_to_default() {
        assert_eq!(AuthorSortField::resolve(Some("shoe_size")), AuthorSortField::Surname);
        assert_eq!(GenreSortField::resolve(Some("popularity")), GenreSortField::Name);
        assert_eq!(BookSortField::resolve(None), BookSortField::Title);
    }

    #[test]
    fn test_sort_field_parsing_is_case_insensitive() {
        assert_eq!(AuthorSortField::resolve(Some("Name")), AuthorSortField::Name);
        assert_eq!(
            BookSortField::resolve(Some(" PUBLISHED_DATE ")),
            BookSortField::PublishedDate
        );
        assert_eq!(
            PublisherSortField::resolve(Some("creation_date")),
            PublisherSortField::CreationDate
        );
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_where_clause_numbers_placeholders_in_order() {
        let clause = WhereClause::new()
            .contains("title", Some("case"))
            .equals("genre_id", None)
            .equals("publisher_id", Some(3))
            .condition(
                "id IN (SELECT book_id FROM book_authors WHERE author_id = {})",
                Some(7),
            );

        assert_eq!(
            clause.to_sql(),
            " WHERE instr(unicode_lower(title), unicode_lower(?1)) > 0 AND publisher_id = ?2 \
             AND id IN (SELECT book_id FROM book_authors WHERE author_id = ?3)"
        );
        assert_eq!(clause.params().len(), 3);
    }

    #[test]
    fn test_empty_where_clause() {
        let clause = WhereClause::new().contains("name", None);
        assert_eq!(clause.to_sql(), "");
        assert!(clause.params().is_empty());
    }

    #[test]
    fn test_order_by() {
        assert_eq!(
            order_by(GenreSortField::Name, SortOrder::Desc),
            "name COLLATE UNICODE_NOCASE DESC, id ASC"
        );
    }
}
