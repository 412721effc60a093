//! Authentication handlers
//!
//! Handles login, logout, and current-user lookup

use std::time::Duration;

use axum::{extract::State, Extension, Json};

use crate::audit::AuditAction;
use crate::auth::{verify_password, CurrentUser};
use crate::core::ServerState;
use crate::db::repository::{account, employee, member};
use crate::AppError;

// Re-use shared DTOs for API consistency
use shared::client::{LoginRequest, LoginResponse, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates account credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = req.username.clone();

    let found = account::find_by_username(&state.pool, &username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let acct = match found {
        Some(a) => {
            if !a.is_active {
                return Err(AppError::forbidden("Account has been disabled".to_string()));
            }

            let password_valid = verify_password(&req.password, &a.password_hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                state
                    .audit_service
                    .log(
                        AuditAction::LoginFailed,
                        "auth",
                        format!("account:{}", username),
                        None,
                        None,
                        serde_json::json!({"reason": "invalid_credentials"}),
                    )
                    .await;
                tracing::warn!(username = %username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            a
        }
        None => {
            state
                .audit_service
                .log(
                    AuditAction::LoginFailed,
                    "auth",
                    format!("account:{}", username),
                    None,
                    None,
                    serde_json::json!({"reason": "user_not_found"}),
                )
                .await;
            tracing::warn!(username = %username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Optional staff / member profiles behind the account
    let staff = employee::find_by_account(&state.pool, acct.id).await?;
    let patron = member::find_by_account(&state.pool, acct.id).await?;

    let role = staff.as_ref().map(|e| e.role);
    let employee_id = staff.as_ref().map(|e| e.id);
    let member_id = patron.as_ref().map(|m| m.id);

    let token = state
        .jwt_service()
        .generate_token(
            acct.id,
            &acct.username,
            &acct.display_name,
            acct.is_superuser,
            role,
            employee_id,
            member_id,
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    state
        .audit_service
        .log(
            AuditAction::LoginSuccess,
            "auth",
            format!("account:{}", acct.id),
            Some(acct.id),
            Some(acct.display_name.clone()),
            serde_json::json!({"username": &acct.username}),
        )
        .await;

    tracing::info!(
        account_id = acct.id,
        username = %acct.username,
        "User logged in successfully"
    );

    let response = LoginResponse {
        token,
        user: UserInfo {
            id: acct.id,
            username: acct.username,
            display_name: acct.display_name,
            is_superuser: acct.is_superuser,
            role,
            employee_id,
            member_id,
        },
    };

    Ok(Json(response))
}

/// Get current user info
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<UserInfo> {
    Json(UserInfo {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        is_superuser: user.is_superuser,
        role: user.role,
        employee_id: user.employee_id,
        member_id: user.member_id,
    })
}

/// Logout handler
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<()> {
    state
        .audit_service
        .log(
            AuditAction::Logout,
            "auth",
            format!("account:{}", user.id),
            Some(user.id),
            Some(user.display_name.clone()),
            serde_json::json!({"username": &user.username}),
        )
        .await;

    tracing::info!(
        account_id = user.id,
        username = %user.username,
        "User logged out"
    );

    Json(())
}
