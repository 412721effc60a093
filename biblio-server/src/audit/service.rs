//! Audit log service
//!
//! [`AuditService`] accepts log requests through an mpsc channel; a
//! background worker drains the channel and appends to storage. A full
//! buffer drops the entry with a warning rather than stalling the
//! request path.

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::mpsc;

use super::storage::AuditStorage;
use super::types::{AuditAction, AuditEntry, AuditQuery};

/// A log request sent to the audit worker
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub operator_id: Option<i64>,
    pub operator_name: Option<String>,
    pub details: serde_json::Value,
}

pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService").finish_non_exhaustive()
    }
}

impl AuditService {
    /// Create the service and the worker's receiving end.
    pub fn new(pool: SqlitePool, buffer_size: usize) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        let storage = AuditStorage::new(pool);
        let service = Arc::new(Self { storage, tx });
        (service, rx)
    }

    /// Enqueue an audit entry.
    pub async fn log(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: impl Into<String>,
        operator_id: Option<i64>,
        operator_name: Option<String>,
        details: serde_json::Value,
    ) {
        let request = AuditLogRequest {
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.into(),
            operator_id,
            operator_name,
            details,
        };
        if let Err(e) = self.tx.try_send(request) {
            tracing::warn!("Audit buffer full, dropping entry: {}", e);
        }
    }

    /// Query the audit trail, newest first.
    pub async fn query(
        &self,
        params: &AuditQuery,
    ) -> Result<Vec<AuditEntry>, super::storage::AuditStorageError> {
        self.storage.query(params).await
    }
}

/// Drain the channel, appending entries until every sender is gone.
pub fn spawn_worker(pool: SqlitePool, mut rx: mpsc::Receiver<AuditLogRequest>) {
    let storage = AuditStorage::new(pool);
    tokio::spawn(async move {
        while let Some(req) = rx.recv().await {
            if let Err(e) = storage
                .append(
                    req.action,
                    req.resource_type,
                    req.resource_id,
                    req.operator_id,
                    req.operator_name,
                    req.details,
                )
                .await
            {
                tracing::error!("Failed to append audit entry: {}", e);
            }
        }
        tracing::debug!("Audit worker stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_log_and_query_roundtrip() {
        let db = DbService::new_in_memory().await.unwrap();
        let (service, rx) = AuditService::new(db.pool.clone(), 16);
        spawn_worker(db.pool.clone(), rx);

        service
            .log(
                AuditAction::EmployeeDeleted,
                "employee",
                "employee:17",
                Some(1),
                Some("Admin".to_string()),
                serde_json::json!({"username": "old_librarian"}),
            )
            .await;

        // Give the worker a moment to drain the channel
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let entries = service
            .query(&AuditQuery {
                action: None,
                limit: None,
                offset: None,
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.action, AuditAction::EmployeeDeleted);
        assert_eq!(entry.resource_id, "employee:17");
        assert_eq!(entry.operator_id, Some(1));
        assert_eq!(entry.details["username"], "old_librarian");

        let filtered = service
            .query(&AuditQuery {
                action: Some("login_failed".to_string()),
                limit: None,
                offset: None,
            })
            .await
            .unwrap();
        assert!(filtered.is_empty());
    }
}
