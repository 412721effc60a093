//! Data models
//!
//! Shared between biblio-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod account;
pub mod author;
pub mod book;
pub mod borrow;
pub mod category;
pub mod employee;
pub mod member;

// Re-exports
pub use account::*;
pub use author::*;
pub use book::*;
pub use borrow::*;
pub use category::*;
pub use employee::*;
pub use member::*;
