//! Audit log type definitions

use serde::{Deserialize, Serialize};

/// Audit action type (enumerated, not free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ Authentication ═══
    /// Successful login
    LoginSuccess,
    /// Failed login attempt
    LoginFailed,
    /// Logout
    Logout,

    // ═══ Circulation (ledger-critical) ═══
    /// Borrow created (checkout)
    BorrowCreated,
    /// Borrow returned
    BorrowReturned,
    /// Borrow record deleted (administrative correction)
    BorrowDeleted,

    // ═══ Management operations ═══
    /// Employee created
    EmployeeCreated,
    /// Employee updated
    EmployeeUpdated,
    /// Employee deleted (with its login account)
    EmployeeDeleted,
    /// Member created
    MemberCreated,
    /// Member updated
    MemberUpdated,
    /// Member deleted
    MemberDeleted,
    /// Book created
    BookCreated,
    /// Book updated
    BookUpdated,
    /// Book deleted
    BookDeleted,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::LoginSuccess => "login_success",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::Logout => "logout",
            AuditAction::BorrowCreated => "borrow_created",
            AuditAction::BorrowReturned => "borrow_returned",
            AuditAction::BorrowDeleted => "borrow_deleted",
            AuditAction::EmployeeCreated => "employee_created",
            AuditAction::EmployeeUpdated => "employee_updated",
            AuditAction::EmployeeDeleted => "employee_deleted",
            AuditAction::MemberCreated => "member_created",
            AuditAction::MemberUpdated => "member_updated",
            AuditAction::MemberDeleted => "member_deleted",
            AuditAction::BookCreated => "book_created",
            AuditAction::BookUpdated => "book_updated",
            AuditAction::BookDeleted => "book_deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "login_success" => AuditAction::LoginSuccess,
            "login_failed" => AuditAction::LoginFailed,
            "logout" => AuditAction::Logout,
            "borrow_created" => AuditAction::BorrowCreated,
            "borrow_returned" => AuditAction::BorrowReturned,
            "borrow_deleted" => AuditAction::BorrowDeleted,
            "employee_created" => AuditAction::EmployeeCreated,
            "employee_updated" => AuditAction::EmployeeUpdated,
            "employee_deleted" => AuditAction::EmployeeDeleted,
            "member_created" => AuditAction::MemberCreated,
            "member_updated" => AuditAction::MemberUpdated,
            "member_deleted" => AuditAction::MemberDeleted,
            "book_created" => AuditAction::BookCreated,
            "book_updated" => AuditAction::BookUpdated,
            "book_deleted" => AuditAction::BookDeleted,
            _ => return None,
        })
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit log entry (immutable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Row ID (monotonic)
    pub id: i64,
    /// Timestamp (Unix millis)
    pub timestamp: i64,
    /// Action type
    pub action: AuditAction,
    /// Resource type ("borrow", "employee", "auth", ...)
    pub resource_type: String,
    /// Resource ID
    pub resource_id: String,
    /// Operator account ID (None for system events)
    pub operator_id: Option<i64>,
    /// Operator display name
    pub operator_name: Option<String>,
    /// Structured details (JSON)
    pub details: serde_json::Value,
}

/// Audit log query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    /// Filter by action (snake_case string)
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_string_roundtrip() {
        for action in [
            AuditAction::LoginSuccess,
            AuditAction::BorrowCreated,
            AuditAction::BorrowReturned,
            AuditAction::EmployeeDeleted,
            AuditAction::BookUpdated,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::parse("no_such_action"), None);
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&AuditAction::EmployeeDeleted).unwrap();
        assert_eq!(json, "\"employee_deleted\"");
    }
}
