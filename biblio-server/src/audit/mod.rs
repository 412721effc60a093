//! Audit logging
//!
//! Append-only audit trail for security-sensitive actions. Writes go
//! through an mpsc channel and a background worker so request handlers
//! never block on audit I/O; queries read the table directly.

pub mod service;
pub mod storage;
pub mod types;

pub use service::{spawn_worker, AuditLogRequest, AuditService};
pub use storage::AuditStorage;
pub use types::{AuditAction, AuditEntry, AuditQuery};
