//! Employee Repository
//!
//! Employees are 1:1 with a login account; create/update/delete keep the
//! pair consistent inside one transaction.

use super::{account, RepoError, RepoResult};
use shared::models::{Employee, EmployeeCreate, EmployeeRole, EmployeeUpdate, EmployeeWithAccount};
use shared::ErrorCode;
use sqlx::SqlitePool;

const EMPLOYEE_WITH_ACCOUNT_SELECT: &str = "SELECT e.id, e.account_id, a.username, a.display_name, a.email, e.role, e.phone, e.address, a.is_active, e.created_at, e.updated_at FROM employee e JOIN account a ON e.account_id = a.id";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<EmployeeWithAccount>> {
    let sql = format!("{} ORDER BY e.created_at DESC", EMPLOYEE_WITH_ACCOUNT_SELECT);
    let employees = sqlx::query_as::<_, EmployeeWithAccount>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(employees)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<EmployeeWithAccount>> {
    let sql = format!("{} WHERE e.id = ?", EMPLOYEE_WITH_ACCOUNT_SELECT);
    let employee = sqlx::query_as::<_, EmployeeWithAccount>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(employee)
}

pub async fn find_by_account(pool: &SqlitePool, account_id: i64) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, account_id, role, phone, address, created_at, updated_at FROM employee WHERE account_id = ?",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employee")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Create an employee together with its login account.
///
/// `password_hash` is pre-hashed by the caller; the confirmation check
/// happens at the handler boundary.
pub async fn create(
    pool: &SqlitePool,
    data: &EmployeeCreate,
    password_hash: &str,
) -> RepoResult<EmployeeWithAccount> {
    if account::find_by_username(pool, &data.username).await?.is_some() {
        return Err(RepoError::Business(
            ErrorCode::DuplicateUsername,
            format!("Username {} is already taken", data.username),
        ));
    }

    let now = shared::util::now_millis();
    let display_name = data.display_name.as_deref().unwrap_or(&data.username);

    let mut tx = pool.begin().await?;

    let account_id = account::create(
        &mut tx,
        &data.username,
        display_name,
        data.email.as_deref(),
        password_hash,
        false,
    )
    .await?;

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO employee (id, account_id, role, phone, address, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(account_id)
    .bind(data.role.unwrap_or(EmployeeRole::Librarian))
    .bind(&data.phone)
    .bind(&data.address)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

/// Update an employee and its linked account.
///
/// `new_password_hash` is set when the caller validated a password change.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &EmployeeUpdate,
    new_password_hash: Option<&str>,
) -> RepoResult<EmployeeWithAccount> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))?;

    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE employee SET role = COALESCE(?, role), phone = COALESCE(?, phone), address = COALESCE(?, address), updated_at = ? WHERE id = ?",
    )
    .bind(data.role)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE account SET display_name = COALESCE(?, display_name), email = COALESCE(?, email), is_active = COALESCE(?, is_active) WHERE id = ?",
    )
    .bind(&data.display_name)
    .bind(&data.email)
    .bind(data.is_active)
    .bind(existing.account_id)
    .execute(&mut *tx)
    .await?;

    if let Some(hash) = new_password_hash {
        account::update_password(&mut tx, existing.account_id, hash).await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

/// Delete an employee and its login account.
///
/// Borrow records keep their history; the FK nulls their employee
/// back-reference. Returns the removed row for the caller's audit entry.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<EmployeeWithAccount> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM employee WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM account WHERE id = ?")
        .bind(existing.account_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(existing)
}
