//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - login / logout / current user
//! - [`dashboard`] - landing page statistics
//! - [`books`] - catalog management
//! - [`members`] - membership management
//! - [`employees`] - staff management (manager only)
//! - [`borrows`] - borrow ledger (checkout / return)
//! - [`audit_log`] - audit trail queries (manager only)

pub mod audit_log;
pub mod auth;
pub mod books;
pub mod borrows;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod members;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
