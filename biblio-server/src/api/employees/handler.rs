//! Employee API handlers
//!
//! Employee create/update also manage the linked login account; deletion
//! removes both and is the security-audited path.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::audit::AuditAction;
use crate::auth::{hash_password, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::employee;
use crate::security_log;
use crate::utils::validation::{
    validate_optional_text, validate_required_text, MAX_EMAIL_LEN, MAX_NAME_LEN,
    MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, MAX_TEXT_LEN,
};
use crate::utils::{AppError, AppResult};
use shared::models::{EmployeeCreate, EmployeeUpdate, EmployeeWithAccount};
use shared::ErrorCode;

/// GET /api/employees - list staff
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<EmployeeWithAccount>>> {
    let employees = employee::find_all(&state.pool).await?;
    Ok(Json(employees))
}

/// GET /api/employees/:id - single employee
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeWithAccount>> {
    let employee = employee::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {}", id)))?;
    Ok(Json(employee))
}

/// POST /api/employees - hire an employee (creates the login account)
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<EmployeeWithAccount>> {
    validate_required_text(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.password, "password", MAX_PASSWORD_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.display_name, "display_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_TEXT_LEN)?;

    if payload.password != payload.confirm_password {
        return Err(AppError::business(
            ErrorCode::PasswordMismatch,
            "Password and confirmation do not match",
        ));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let employee = employee::create(&state.pool, &payload, &password_hash).await?;

    state
        .audit_service
        .log(
            AuditAction::EmployeeCreated,
            "employee",
            employee.id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({"username": &employee.username, "role": employee.role}),
        )
        .await;

    Ok(Json(employee))
}

/// PUT /api/employees/:id - update an employee
///
/// A password rotation requires matching confirmation.
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<EmployeeWithAccount>> {
    validate_optional_text(&payload.display_name, "display_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_TEXT_LEN)?;
    validate_optional_text(&payload.new_password, "new_password", MAX_PASSWORD_LEN)?;

    let new_password_hash = match &payload.new_password {
        Some(new_password) if !new_password.is_empty() => {
            if payload.confirm_password.as_deref() != Some(new_password.as_str()) {
                return Err(AppError::business(
                    ErrorCode::PasswordMismatch,
                    "Password and confirmation do not match",
                ));
            }
            Some(
                hash_password(new_password)
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?,
            )
        }
        _ => None,
    };

    let employee =
        employee::update(&state.pool, id, &payload, new_password_hash.as_deref()).await?;

    state
        .audit_service
        .log(
            AuditAction::EmployeeUpdated,
            "employee",
            id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({
                "username": &employee.username,
                "role": employee.role,
                "password_rotated": new_password_hash.is_some(),
            }),
        )
        .await;

    Ok(Json(employee))
}

/// DELETE /api/employees/:id - remove an employee and its login account
///
/// Borrow history keeps the record with a nulled employee reference.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let removed = employee::delete(&state.pool, id).await?;

    // Security trail: who removed which staff account
    security_log!(
        "WARN",
        "employee_deleted",
        operator = current_user.username.clone(),
        deleted_username = removed.username.clone()
    );

    state
        .audit_service
        .log(
            AuditAction::EmployeeDeleted,
            "employee",
            id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({
                "username": &removed.username,
                "role": removed.role,
                "account_id": removed.account_id,
            }),
        )
        .await;

    Ok(Json(true))
}
