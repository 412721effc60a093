//! Shared types for the Biblio circulation system
//!
//! Common types used across crates: domain models, unified error codes,
//! and small utility helpers (timestamps, ID generation).

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::ErrorCode;
pub use serde::{Deserialize, Serialize};
