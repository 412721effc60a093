//! Client-facing auth DTOs
//!
//! Shared between the server and API clients so login payloads stay in
//! sync.

use serde::{Deserialize, Serialize};

use crate::models::EmployeeRole;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Authenticated principal info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub is_superuser: bool,
    /// Staff role, when the account has an employee profile
    pub role: Option<EmployeeRole>,
    pub employee_id: Option<i64>,
    pub member_id: Option<i64>,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}
