//! Account Repository
//!
//! Login accounts are created through the employee workflow (or the
//! startup bootstrap); there is no standalone account CRUD API.

use super::{RepoError, RepoResult};
use shared::models::Account;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, username, display_name, email, password_hash, is_superuser, is_active, created_at FROM account WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, username, display_name, email, password_hash, is_superuser, is_active, created_at FROM account WHERE username = ? LIMIT 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

/// Insert a login account and return its ID. Transaction-scoped so the
/// caller can pair it with the profile insert.
pub async fn create(
    conn: &mut SqliteConnection,
    username: &str,
    display_name: &str,
    email: Option<&str>,
    password_hash: &str,
    is_superuser: bool,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO account (id, username, display_name, email, password_hash, is_superuser, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(username)
    .bind(display_name)
    .bind(email)
    .bind(password_hash)
    .bind(is_superuser)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

pub async fn update_password(
    conn: &mut SqliteConnection,
    id: i64,
    password_hash: &str,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE account SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Account {id} not found")));
    }
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
