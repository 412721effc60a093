//! Borrow API handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::borrow;
use crate::utils::{AppError, AppResult};
use shared::models::{BorrowCreate, BorrowReturn, BorrowWithDetails};

/// GET /api/borrows - the ledger, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<BorrowWithDetails>>> {
    let borrows = borrow::find_all(&state.pool).await?;
    Ok(Json(borrows))
}

/// GET /api/borrows/:id - single borrow record
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BorrowWithDetails>> {
    let borrow = borrow::find_with_details(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Borrow {}", id)))?;
    Ok(Json(borrow))
}

/// POST /api/borrows - check a book out to a member
///
/// The processing employee is taken from the authenticated principal.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<BorrowCreate>,
) -> AppResult<Json<BorrowWithDetails>> {
    let borrow = state
        .circulation
        .checkout(&payload, current_user.employee_id)
        .await?;

    state
        .audit_service
        .log(
            AuditAction::BorrowCreated,
            "borrow",
            borrow.id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({
                "book_id": borrow.book_id,
                "member_id": borrow.member_id,
                "due_date": borrow.due_date,
            }),
        )
        .await;

    Ok(Json(borrow))
}

/// POST /api/borrows/:id/return - return a borrowed book
pub async fn return_borrow(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<BorrowReturn>,
) -> AppResult<Json<BorrowWithDetails>> {
    let borrow = state.circulation.return_borrow(id, &payload).await?;

    state
        .audit_service
        .log(
            AuditAction::BorrowReturned,
            "borrow",
            id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({
                "book_id": borrow.book_id,
                "member_id": borrow.member_id,
                "return_date": borrow.return_date,
                "fine_amount": borrow.fine_amount,
            }),
        )
        .await;

    Ok(Json(borrow))
}

/// DELETE /api/borrows/:id - administrative correction
///
/// Refused while the record is still outstanding; deleting a returned
/// record reverses no counters.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = borrow::delete(&state.pool, id).await?;

    if result {
        state
            .audit_service
            .log(
                AuditAction::BorrowDeleted,
                "borrow",
                id.to_string(),
                Some(current_user.id),
                Some(current_user.display_name.clone()),
                serde_json::json!({}),
            )
            .await;
    }

    Ok(Json(result))
}
