//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::AppError;

/// Authentication middleware - requires a logged-in principal
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`.
/// On success the [`CurrentUser`] is injected into request extensions.
///
/// # Paths that skip authentication
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (they 404 normally)
/// - `/api/auth/login`
/// - `/api/health`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = path == "/api/auth/login" || path == "/api/health";
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or_else(AppError::invalid_token)?
        }
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token()),
            }
        }
    }
}

/// Management middleware - requires superuser or an employee with the
/// manager role
///
/// # Errors
///
/// 403 Forbidden for any other principal, including accounts with no
/// employee profile at all.
pub async fn require_manager(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;
    if !user.is_manager_or_admin() {
        security_log!(
            "WARN",
            "manager_required",
            user_id = user.id,
            username = user.username.clone()
        );
        return Err(AppError::forbidden("Manager role is required"));
    }

    Ok(next.run(req).await)
}

/// Extension trait for pulling the CurrentUser out of a request
pub trait CurrentUserExt {
    /// Get the CurrentUser from request extensions
    ///
    /// # Errors
    ///
    /// 401 Unauthorized when unauthenticated
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or(AppError::Unauthorized)
    }
}
