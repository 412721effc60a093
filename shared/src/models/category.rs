//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
///
/// Resolved by exact name match, same as [`super::Author`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
}
