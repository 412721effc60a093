//! Author Model

use serde::{Deserialize, Serialize};

/// Author entity
///
/// Authors are resolved by exact name match when books are created or
/// updated from free-text author names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub biography: Option<String>,
}
