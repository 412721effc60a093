//! Member Model

use serde::{Deserialize, Serialize};

/// Membership type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MembershipType {
    Student,
    Teacher,
    Visitor,
}

/// Membership level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MembershipLevel {
    Regular,
    Silver,
    Gold,
}

/// Member entity
///
/// Invariant: `0 <= current_borrowed <= max_borrow_limit`. The counter is
/// only mutated inside circulation checkout/return transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    /// Optional linked login account
    pub account_id: Option<i64>,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub membership_type: MembershipType,
    pub membership_level: MembershipLevel,
    pub max_borrow_limit: i64,
    pub current_borrowed: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Member {
    /// Whether another checkout is permitted under the borrow limit
    pub fn can_borrow(&self) -> bool {
        self.current_borrowed < self.max_borrow_limit
    }
}

/// Create member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCreate {
    pub account_id: Option<i64>,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub membership_type: Option<MembershipType>,
    pub membership_level: Option<MembershipLevel>,
    pub max_borrow_limit: Option<i64>,
}

/// Update member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_type: Option<MembershipType>,
    pub membership_level: Option<MembershipLevel>,
    pub max_borrow_limit: Option<i64>,
}
