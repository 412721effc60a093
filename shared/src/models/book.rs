//! Book Model

use serde::{Deserialize, Serialize};

use super::Author;

/// Book lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved,
    Lost,
}

impl BookStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Reserved => "reserved",
            BookStatus::Lost => "lost",
        }
    }
}

/// Book entity
///
/// Invariant: `0 <= available_copies <= total_copies`. The counters are
/// only mutated inside circulation checkout/return transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// Globally unique ISBN
    pub isbn: String,
    pub category_id: Option<i64>,
    pub publication_year: Option<i32>,
    pub total_copies: i64,
    pub available_copies: i64,
    /// Path to the cover image (upload handling is external)
    pub cover_image: Option<String>,
    pub status: BookStatus,
    pub added_date: i64,
    pub last_updated: i64,
}

/// Create book payload
///
/// Authors and category arrive as free-text names and are resolved with
/// get-or-create semantics (exact string match).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookCreate {
    pub title: String,
    pub isbn: String,
    #[serde(default)]
    pub author_names: Vec<String>,
    pub category_name: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: Option<i64>,
    /// Defaults to `total_copies` when omitted
    pub available_copies: Option<i64>,
    pub cover_image: Option<String>,
}

/// Update book payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub author_names: Option<Vec<String>>,
    pub category_name: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: Option<i64>,
    pub available_copies: Option<i64>,
    pub cover_image: Option<String>,
    pub status: Option<BookStatus>,
}

/// Book with resolved relations (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BookWithDetails {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub cover_image: Option<String>,
    pub status: BookStatus,
    pub added_date: i64,
    pub last_updated: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    /// Authors in their stored order (junction table)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub authors: Vec<Author>,
}
