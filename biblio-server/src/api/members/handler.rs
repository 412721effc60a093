//! Member API handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::member;
use crate::utils::validation::{
    validate_optional_text, validate_required_text, MAX_EMAIL_LEN, MAX_NAME_LEN,
    MAX_SHORT_TEXT_LEN,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Member, MemberCreate, MemberUpdate};

/// GET /api/members - list members
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Member>>> {
    let members = member::find_all(&state.pool).await?;
    Ok(Json(members))
}

/// GET /api/members/:id - single member
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Member>> {
    let member = member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {}", id)))?;
    Ok(Json(member))
}

/// POST /api/members - register a member
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<Member>> {
    validate_required_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;

    let member = member::create(&state.pool, payload).await?;

    state
        .audit_service
        .log(
            AuditAction::MemberCreated,
            "member",
            member.id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({"full_name": &member.full_name}),
        )
        .await;

    Ok(Json(member))
}

/// PUT /api/members/:id - update a member
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<Member>> {
    if let Some(ref name) = payload.full_name {
        validate_required_text(name, "full_name", MAX_NAME_LEN)?;
    }
    if let Some(ref phone) = payload.phone {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;

    let member = member::update(&state.pool, id, payload).await?;

    state
        .audit_service
        .log(
            AuditAction::MemberUpdated,
            "member",
            id.to_string(),
            Some(current_user.id),
            Some(current_user.display_name.clone()),
            serde_json::json!({"full_name": &member.full_name}),
        )
        .await;

    Ok(Json(member))
}

/// DELETE /api/members/:id - remove a member
///
/// Blocked while the member still holds borrowed copies.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let name_for_audit = member::find_by_id(&state.pool, id)
        .await
        .ok()
        .flatten()
        .map(|m| m.full_name)
        .unwrap_or_default();

    let result = member::delete(&state.pool, id).await?;

    if result {
        state
            .audit_service
            .log(
                AuditAction::MemberDeleted,
                "member",
                id.to_string(),
                Some(current_user.id),
                Some(current_user.display_name.clone()),
                serde_json::json!({"full_name": name_for_audit}),
            )
            .await;
    }

    Ok(Json(result))
}
