//! Dashboard handler: landing page statistics

use axum::{extract::State, Json};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::{book, borrow, employee, member};
use crate::utils::AppResult;
use shared::models::{BookWithDetails, BorrowWithDetails};

const LATEST_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_books: i64,
    pub total_members: i64,
    pub total_employees: i64,
    /// Borrows currently holding a copy out (active + overdue)
    pub total_borrowed: i64,
    pub latest_books: Vec<BookWithDetails>,
    pub latest_borrows: Vec<BorrowWithDetails>,
}

/// GET /api/dashboard
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<DashboardSummary>> {
    let summary = DashboardSummary {
        total_books: book::count(&state.pool).await?,
        total_members: member::count(&state.pool).await?,
        total_employees: employee::count(&state.pool).await?,
        total_borrowed: borrow::count_outstanding(&state.pool).await?,
        latest_books: book::latest(&state.pool, LATEST_LIMIT).await?,
        latest_borrows: borrow::latest(&state.pool, LATEST_LIMIT).await?,
    };
    Ok(Json(summary))
}
