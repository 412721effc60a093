//! Borrow Model
//!
//! A borrow record is the ledger entry tying a book, a member and the
//! processing employee together. Status transitions are one-directional:
//! `active -> returned` or `active -> overdue -> returned`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Borrow lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum BorrowStatus {
    Active,
    Overdue,
    Returned,
}

impl BorrowStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Active => "active",
            BorrowStatus::Overdue => "overdue",
            BorrowStatus::Returned => "returned",
        }
    }

    /// Active and overdue records both hold a copy out of circulation
    pub const fn is_outstanding(&self) -> bool {
        matches!(self, BorrowStatus::Active | BorrowStatus::Overdue)
    }
}

/// Borrow entity
///
/// Invariants: `due_date >= borrow_date`; `fine_amount >= 0`; `return_date`
/// is set exactly once, when the record reaches `returned`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Borrow {
    pub id: i64,
    pub book_id: i64,
    pub member_id: i64,
    /// Processing employee; nulled when the employee is removed
    pub employee_id: Option<i64>,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine_amount: f64,
    pub status: BorrowStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create borrow payload (checkout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowCreate {
    pub book_id: i64,
    pub member_id: i64,
    /// Defaults to `borrow_date + loan period` when omitted
    pub due_date: Option<NaiveDate>,
}

/// Return borrow payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BorrowReturn {
    /// Defaults to today (business timezone) when omitted
    pub return_date: Option<NaiveDate>,
}

/// Borrow joined with book / member / employee names (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BorrowWithDetails {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub book_isbn: String,
    pub member_id: i64,
    pub member_name: String,
    pub employee_id: Option<i64>,
    pub employee_name: Option<String>,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine_amount: f64,
    pub status: BorrowStatus,
    pub created_at: i64,
    pub updated_at: i64,
}
