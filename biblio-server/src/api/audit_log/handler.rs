//! Audit log handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::audit::{AuditEntry, AuditQuery};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/audit-log?action=...&limit=...&offset=...
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    let entries = state
        .audit_service
        .query(&params)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(entries))
}
