//! Audit log storage
//!
//! Direct table access for the audit trail. Entries are append-only;
//! there is no update or delete path.

use sqlx::{Row, SqlitePool};
use thiserror::Error;

use super::types::{AuditAction, AuditEntry, AuditQuery};

#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct AuditStorage {
    pool: SqlitePool,
}

impl AuditStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one entry.
    pub async fn append(
        &self,
        action: AuditAction,
        resource_type: String,
        resource_id: String,
        operator_id: Option<i64>,
        operator_name: Option<String>,
        details: serde_json::Value,
    ) -> Result<(), AuditStorageError> {
        let now = shared::util::now_millis();
        sqlx::query(
            "INSERT INTO audit_log (timestamp, action, resource_type, resource_id, operator_id, operator_name, details) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(now)
        .bind(action.as_str())
        .bind(&resource_type)
        .bind(&resource_id)
        .bind(operator_id)
        .bind(&operator_name)
        .bind(details.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Query entries, newest first.
    pub async fn query(&self, params: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStorageError> {
        let limit = params.limit.unwrap_or(100).clamp(1, 1000);
        let offset = params.offset.unwrap_or(0).max(0);

        let rows = match &params.action {
            Some(action) => {
                sqlx::query(
                    "SELECT id, timestamp, action, resource_type, resource_id, operator_id, operator_name, details FROM audit_log WHERE action = ? ORDER BY id DESC LIMIT ? OFFSET ?",
                )
                .bind(action)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, timestamp, action, resource_type, resource_id, operator_id, operator_name, details FROM audit_log ORDER BY id DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let entries = rows
            .into_iter()
            .filter_map(|row| {
                let action_str: String = row.get("action");
                // Unknown action strings would mean a schema drift; skip them
                let action = AuditAction::parse(&action_str)?;
                let details_str: String = row.get("details");
                let details =
                    serde_json::from_str(&details_str).unwrap_or(serde_json::Value::Null);
                Some(AuditEntry {
                    id: row.get("id"),
                    timestamp: row.get("timestamp"),
                    action,
                    resource_type: row.get("resource_type"),
                    resource_id: row.get("resource_id"),
                    operator_id: row.get("operator_id"),
                    operator_name: row.get("operator_name"),
                    details,
                })
            })
            .collect();

        Ok(entries)
    }
}
