//! Borrow Repository
//!
//! Row access for the borrow ledger. State transitions are orchestrated
//! by the circulation module; the guarded updates here only make each
//! transition idempotent at the SQL level.

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{Borrow, BorrowWithDetails};
use shared::ErrorCode;
use sqlx::{SqliteConnection, SqlitePool};

const BORROW_SELECT: &str = "SELECT id, book_id, member_id, employee_id, borrow_date, due_date, return_date, fine_amount, status, created_at, updated_at FROM borrow";

const BORROW_DETAILS_SELECT: &str = "SELECT br.id, br.book_id, b.title AS book_title, b.isbn AS book_isbn, br.member_id, m.full_name AS member_name, br.employee_id, a.display_name AS employee_name, br.borrow_date, br.due_date, br.return_date, br.fine_amount, br.status, br.created_at, br.updated_at FROM borrow br JOIN book b ON br.book_id = b.id JOIN member m ON br.member_id = m.id LEFT JOIN employee e ON br.employee_id = e.id LEFT JOIN account a ON e.account_id = a.id";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<BorrowWithDetails>> {
    let sql = format!(
        "{} ORDER BY br.borrow_date DESC, br.created_at DESC",
        BORROW_DETAILS_SELECT
    );
    let borrows = sqlx::query_as::<_, BorrowWithDetails>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(borrows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Borrow>> {
    let sql = format!("{} WHERE id = ?", BORROW_SELECT);
    let borrow = sqlx::query_as::<_, Borrow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(borrow)
}

/// Read a borrow row through the transaction's own connection, so the
/// state checked is the state the transaction will update.
pub async fn find_by_id_for_update(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<Borrow>> {
    let sql = format!("{} WHERE id = ?", BORROW_SELECT);
    let borrow = sqlx::query_as::<_, Borrow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(borrow)
}

pub async fn find_with_details(pool: &SqlitePool, id: i64) -> RepoResult<Option<BorrowWithDetails>> {
    let sql = format!("{} WHERE br.id = ?", BORROW_DETAILS_SELECT);
    let borrow = sqlx::query_as::<_, BorrowWithDetails>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(borrow)
}

/// Most recent borrows (dashboard)
pub async fn latest(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<BorrowWithDetails>> {
    let sql = format!(
        "{} ORDER BY br.borrow_date DESC, br.created_at DESC LIMIT ?",
        BORROW_DETAILS_SELECT
    );
    let borrows = sqlx::query_as::<_, BorrowWithDetails>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(borrows)
}

/// Borrows still holding a copy out of circulation (active + overdue)
pub async fn count_outstanding(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM borrow WHERE status IN ('active', 'overdue')")
            .fetch_one(pool)
            .await?;
    Ok(n)
}

/// Insert a new active borrow row (transaction-scoped).
pub async fn insert(
    conn: &mut SqliteConnection,
    book_id: i64,
    member_id: i64,
    employee_id: Option<i64>,
    borrow_date: NaiveDate,
    due_date: NaiveDate,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO borrow (id, book_id, member_id, employee_id, borrow_date, due_date, return_date, fine_amount, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, NULL, 0, 'active', ?, ?)",
    )
    .bind(id)
    .bind(book_id)
    .bind(member_id)
    .bind(employee_id)
    .bind(borrow_date)
    .bind(due_date)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Close an outstanding borrow (transaction-scoped).
///
/// The status guard makes a concurrent double-return lose cleanly: the
/// second writer matches zero rows.
pub async fn finalize_return(
    conn: &mut SqliteConnection,
    id: i64,
    return_date: NaiveDate,
    fine_amount: f64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE borrow SET return_date = ?, fine_amount = ?, status = 'returned', updated_at = ? WHERE id = ? AND status IN ('active', 'overdue')",
    )
    .bind(return_date)
    .bind(fine_amount)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::BorrowAlreadyReturned,
            format!("Borrow {id} has already been returned"),
        ));
    }
    Ok(())
}

/// Active borrows past their due date as of `today` (overdue sweep input).
pub async fn find_due_for_sweep(pool: &SqlitePool, today: NaiveDate) -> RepoResult<Vec<Borrow>> {
    let sql = format!(
        "{} WHERE status = 'active' AND return_date IS NULL AND due_date < ?",
        BORROW_SELECT
    );
    let borrows = sqlx::query_as::<_, Borrow>(&sql)
        .bind(today)
        .fetch_all(pool)
        .await?;
    Ok(borrows)
}

/// Overdue borrows whose accrued fine needs refreshing.
pub async fn find_overdue(pool: &SqlitePool) -> RepoResult<Vec<Borrow>> {
    let sql = format!("{} WHERE status = 'overdue'", BORROW_SELECT);
    let borrows = sqlx::query_as::<_, Borrow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(borrows)
}

/// Flip an active borrow to overdue with its accrued fine.
pub async fn set_overdue(pool: &SqlitePool, id: i64, fine_amount: f64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE borrow SET status = 'overdue', fine_amount = ?, updated_at = ? WHERE id = ? AND status = 'active'",
    )
    .bind(fine_amount)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Refresh the accrued fine on an overdue borrow.
pub async fn set_fine(pool: &SqlitePool, id: i64, fine_amount: f64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE borrow SET fine_amount = ?, updated_at = ? WHERE id = ? AND status = 'overdue'",
    )
    .bind(fine_amount)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Delete a borrow record.
///
/// An administrative correction, not a return: it reverses nothing, and is
/// therefore forbidden while the record still holds a copy out.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Borrow {id} not found")))?;
    if existing.status.is_outstanding() {
        return Err(RepoError::Business(
            ErrorCode::BorrowStillActive,
            format!(
                "Borrow {id} is still {}; return it before deleting",
                existing.status.as_str()
            ),
        ));
    }

    let rows = sqlx::query("DELETE FROM borrow WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
