//! Employee Model

use serde::{Deserialize, Serialize};

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum EmployeeRole {
    Manager,
    Librarian,
    Assistant,
}

impl EmployeeRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::Manager => "manager",
            EmployeeRole::Librarian => "librarian",
            EmployeeRole::Assistant => "assistant",
        }
    }
}

/// Employee entity (staff profile, 1:1 with a login account)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub account_id: i64,
    pub role: EmployeeRole,
    pub phone: String,
    pub address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Employee joined with its login account (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeWithAccount {
    pub id: i64,
    pub account_id: i64,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: EmployeeRole,
    pub phone: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload (also creates the login account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<EmployeeRole>,
    pub phone: String,
    pub address: Option<String>,
}

/// Update employee payload
///
/// `new_password` rotates the linked account's password when set; the
/// confirmation field must match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<EmployeeRole>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
    pub is_active: Option<bool>,
}
