//! JWT token service
//!
//! Generates, validates and parses access tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::EmployeeRole;
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match load_jwt_secret() {
            Ok(secret) => secret,
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT configuration error: {}, generating temporary key", e);
                    generate_printable_jwt_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: JWT_SECRET configuration failed: {}", e);
                }
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 24 hours
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "biblio-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "biblio-clients".to_string()),
        }
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID (subject)
    pub sub: String,
    /// Account ID as a number (avoids re-parsing `sub`)
    pub account_id: i64,
    /// Username
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Superuser flag
    pub is_superuser: bool,
    /// Staff role, when the account has an employee profile
    pub role: Option<EmployeeRole>,
    /// Linked employee profile
    pub employee_id: Option<i64>,
    /// Linked member profile
    pub member_id: Option<i64>,
    /// Token type
    pub token_type: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Generate a printable random secret (development fallback)
fn generate_printable_jwt_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";
    let rng = SystemRandom::new();
    let mut key = String::with_capacity(64);
    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "BiblioServerDevelopmentFallbackKey2025!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }
    key
}

/// Load the JWT secret from the environment
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret)
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set, generating temporary key for development");
                Ok(generate_printable_jwt_secret())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production".to_string(),
                ))
            }
        }
    }
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with default configuration
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// Create a new JWT service with the given configuration
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token for an authenticated principal
    #[allow(clippy::too_many_arguments)]
    pub fn generate_token(
        &self,
        account_id: i64,
        username: &str,
        display_name: &str,
        is_superuser: bool,
        role: Option<EmployeeRole>,
        employee_id: Option<i64>,
        member_id: Option<i64>,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: account_id.to_string(),
            account_id,
            username: username.to_string(),
            display_name: display_name.to_string(),
            is_superuser,
            role,
            employee_id,
            member_id,
            token_type: "access".to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the bearer token from an Authorization header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Authenticated principal context (parsed from JWT claims)
///
/// Created by the auth middleware and injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Account ID
    pub id: i64,
    /// Username
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Superuser flag
    pub is_superuser: bool,
    /// Staff role, when the account has an employee profile
    pub role: Option<EmployeeRole>,
    /// Linked employee profile
    pub employee_id: Option<i64>,
    /// Linked member profile
    pub member_id: Option<i64>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.account_id,
            username: claims.username,
            display_name: claims.display_name,
            is_superuser: claims.is_superuser,
            role: claims.role,
            employee_id: claims.employee_id,
            member_id: claims.member_id,
        }
    }
}

impl CurrentUser {
    /// The management predicate: superuser, or an employee profile with
    /// the manager role.
    ///
    /// A principal with no employee association is simply not a manager;
    /// this must never error.
    pub fn is_manager_or_admin(&self) -> bool {
        self.is_superuser || matches!(self.role, Some(EmployeeRole::Manager))
    }

    /// Whether the account has a staff profile at all
    pub fn is_staff(&self) -> bool {
        self.is_superuser || self.employee_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-test-secret-test-secret!".to_string(),
            expiration_minutes: 60,
            issuer: "biblio-server".to_string(),
            audience: "biblio-clients".to_string(),
        })
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = test_service();

        let token = service
            .generate_token(
                42,
                "sara",
                "Sara K",
                false,
                Some(EmployeeRole::Librarian),
                Some(7),
                None,
            )
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.account_id, 42);
        assert_eq!(claims.username, "sara");
        assert_eq!(claims.role, Some(EmployeeRole::Librarian));
        assert_eq!(claims.employee_id, Some(7));

        let user = CurrentUser::from(claims);
        assert_eq!(user.id, 42);
        assert!(!user.is_manager_or_admin());
    }

    #[test]
    fn test_manager_predicate() {
        let manager = CurrentUser {
            id: 1,
            username: "amal".to_string(),
            display_name: "Amal".to_string(),
            is_superuser: false,
            role: Some(EmployeeRole::Manager),
            employee_id: Some(2),
            member_id: None,
        };
        assert!(manager.is_manager_or_admin());

        let superuser = CurrentUser {
            id: 2,
            username: "root".to_string(),
            display_name: "Root".to_string(),
            is_superuser: true,
            role: None,
            employee_id: None,
            member_id: None,
        };
        assert!(superuser.is_manager_or_admin());
    }

    #[test]
    fn test_predicate_is_false_without_employee_association() {
        // A plain account with no staff profile must evaluate to false,
        // not error
        let patron = CurrentUser {
            id: 3,
            username: "reader".to_string(),
            display_name: "Reader".to_string(),
            is_superuser: false,
            role: None,
            employee_id: None,
            member_id: Some(9),
        };
        assert!(!patron.is_manager_or_admin());
        assert!(!patron.is_staff());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service();
        let token = service
            .generate_token(1, "a", "A", true, None, None, None)
            .unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.validate_token(&tampered).is_err());
    }
}
