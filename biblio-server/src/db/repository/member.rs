//! Member Repository
//!
//! Owns the per-member borrow counter. `record_checkout` / `record_return`
//! are the only places `current_borrowed` moves, inside circulation
//! transactions.

use super::{RepoError, RepoResult};
use shared::models::{Member, MemberCreate, MemberUpdate, MembershipLevel, MembershipType};
use shared::ErrorCode;
use sqlx::{SqliteConnection, SqlitePool};

const MEMBER_SELECT: &str = "SELECT id, account_id, full_name, email, phone, membership_type, membership_level, max_borrow_limit, current_borrowed, created_at, updated_at FROM member";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Member>> {
    let sql = format!("{} ORDER BY created_at DESC", MEMBER_SELECT);
    let members = sqlx::query_as::<_, Member>(&sql).fetch_all(pool).await?;
    Ok(members)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{} WHERE id = ?", MEMBER_SELECT);
    let member = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(member)
}

pub async fn find_by_account(pool: &SqlitePool, account_id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{} WHERE account_id = ?", MEMBER_SELECT);
    let member = sqlx::query_as::<_, Member>(&sql)
        .bind(account_id)
        .fetch_optional(pool)
        .await?;
    Ok(member)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(pool: &SqlitePool, data: MemberCreate) -> RepoResult<Member> {
    let limit = data.max_borrow_limit.unwrap_or(3);
    if limit < 0 {
        return Err(RepoError::Validation(format!(
            "max_borrow_limit cannot be negative: {limit}"
        )));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO member (id, account_id, full_name, email, phone, membership_type, membership_level, max_borrow_limit, current_borrowed, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(id)
    .bind(data.account_id)
    .bind(&data.full_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.membership_type.unwrap_or(MembershipType::Student))
    .bind(data.membership_level.unwrap_or(MembershipLevel::Regular))
    .bind(limit)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MemberUpdate) -> RepoResult<Member> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))?;

    let limit = data.max_borrow_limit.unwrap_or(existing.max_borrow_limit);
    if limit < existing.current_borrowed {
        return Err(RepoError::Validation(format!(
            "max_borrow_limit ({limit}) cannot drop below the {} copies currently borrowed",
            existing.current_borrowed
        )));
    }

    let now = shared::util::now_millis();
    // The counter guard is repeated in the WHERE clause so a concurrent
    // checkout cannot slip between the read above and this write.
    let rows = sqlx::query(
        "UPDATE member SET full_name = COALESCE(?, full_name), email = COALESCE(?, email), phone = COALESCE(?, phone), membership_type = COALESCE(?, membership_type), membership_level = COALESCE(?, membership_level), max_borrow_limit = ?, updated_at = ? WHERE id = ? AND current_borrowed <= ?",
    )
    .bind(&data.full_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.membership_type)
    .bind(data.membership_level)
    .bind(limit)
    .bind(now)
    .bind(id)
    .bind(limit)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Validation(format!(
            "max_borrow_limit ({limit}) cannot drop below the copies currently borrowed"
        )));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}

/// Delete a member. Blocked while the member still holds borrowed copies;
/// historical borrow rows are removed by the FK cascade.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))?;
    if existing.current_borrowed > 0 {
        return Err(RepoError::Business(
            ErrorCode::MemberHasActiveBorrows,
            format!(
                "Member {id} still holds {} borrowed cop(ies)",
                existing.current_borrowed
            ),
        ));
    }

    let rows = sqlx::query("DELETE FROM member WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Circulation counter operations (transaction-scoped) ─────────────

/// Record a checkout against the member's limit.
///
/// Guarded update: fails with `BorrowLimitExceeded` when the member is
/// already at `max_borrow_limit`. Must run before the book-side decrement
/// so a limit violation never costs an inventory slot.
pub async fn record_checkout(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET current_borrowed = current_borrowed + 1, updated_at = ? WHERE id = ? AND current_borrowed < max_borrow_limit",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member WHERE id = ?")
            .bind(id)
            .fetch_one(conn)
            .await?;
        return Err(if exists == 0 {
            RepoError::NotFound(format!("Member {id} not found"))
        } else {
            RepoError::Business(
                ErrorCode::BorrowLimitExceeded,
                format!("Member {id} has reached the borrow limit"),
            )
        });
    }
    Ok(())
}

/// Record a return. Floored at zero, defensive against inconsistent history.
pub async fn record_return(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET current_borrowed = MAX(current_borrowed - 1, 0), updated_at = ? WHERE id = ?",
    )
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    Ok(())
}
