//! Login Account Model
//!
//! A login account is distinct from the Employee / Member profile that may
//! link to it. Superuser status lives here, not on the staff profile.

use serde::{Deserialize, Serialize};

/// Login account entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: i64,
}
