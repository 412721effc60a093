use chrono::NaiveDate;
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;
use shared::ErrorCode;

/// Circulation errors
#[derive(Debug, Error)]
pub enum CirculationError {
    #[error("Borrow not found: {0}")]
    BorrowNotFound(i64),

    #[error("Borrow already returned: {0}")]
    AlreadyReturned(i64),

    #[error("Return date {return_date} is before borrow date {borrow_date}")]
    InvalidDateRange {
        borrow_date: NaiveDate,
        return_date: NaiveDate,
    },

    #[error("Due date {due_date} is before borrow date {borrow_date}")]
    InvalidDueDate {
        borrow_date: NaiveDate,
        due_date: NaiveDate,
    },

    /// Catalog / membership precondition failures surface through the
    /// repository layer (insufficient copies, borrow limit, over-return).
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<CirculationError> for AppError {
    fn from(err: CirculationError) -> Self {
        match err {
            CirculationError::BorrowNotFound(id) => {
                AppError::not_found(format!("Borrow {id} not found"))
            }
            CirculationError::AlreadyReturned(id) => AppError::business(
                ErrorCode::BorrowAlreadyReturned,
                format!("Borrow {id} has already been returned"),
            ),
            CirculationError::InvalidDateRange { .. } | CirculationError::InvalidDueDate { .. } => {
                AppError::business(ErrorCode::InvalidDateRange, err.to_string())
            }
            CirculationError::Repo(e) => e.into(),
        }
    }
}

pub type CirculationResult<T> = Result<T, CirculationError>;
