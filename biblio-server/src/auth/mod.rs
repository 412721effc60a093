//! Authentication and authorization
//!
//! - [`JwtService`] - JWT token service
//! - [`CurrentUser`] - authenticated principal context
//! - [`require_auth`] - authentication middleware
//! - [`require_manager`] - manager-or-superuser middleware

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_manager, CurrentUserExt};
pub use password::{hash_password, verify_password};
