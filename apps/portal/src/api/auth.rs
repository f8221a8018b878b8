//! # Authentication Module
//!
//! Password hashing and bearer-token authentication for the One Portal API.
//!
//! ## Usage
//!
//! Clients obtain a token from `/api/users/register` or `/api/users/login`
//! and send it on every protected request:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! The token only identifies the caller. Admin rights are always read from
//! the stored user, so a promotion or demotion applies to tokens already
//! issued.

use super::{AppState, error::ApiError};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use portal_core::{Actor, PortalError, User, UserId};
use serde::{Deserialize, Serialize};

// =============================================================================
// PASSWORDS
// =============================================================================

/// Hash a plaintext password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortalError::Storage(format!("Password hashing failed: {}", e)))
}

/// Check a plaintext password against a stored argon2 hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

// =============================================================================
// TOKENS
// =============================================================================

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: UserId,
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Sign a token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, PortalError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| PortalError::Serialization(format!("Token signing failed: {}", e)))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// The authenticated caller, loaded from the store.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id, self.0.is_admin)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header_value) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            tracing::warn!(
                event = "auth_failure",
                reason = "missing_authorization_header",
                "Missing Authorization header"
            );
            return Err(ApiError::Unauthorized("Authorization token not provided"));
        };

        let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value).trim();
        let Some(claims) = state.tokens.verify(token) else {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_token",
                "Authentication failed: invalid or expired token"
            );
            return Err(ApiError::Unauthorized("Invalid or expired token"));
        };

        let user = state.portal.get_user(claims.user_id)?;
        Ok(Self(user))
    }
}

/// An authenticated caller whose stored account has admin rights.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl AdminUser {
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id, true)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(
                event = "auth_failure",
                reason = "admin_required",
                user = %user.id,
                "Admin-only route called by a regular user"
            );
            return Err(PortalError::Authorization("Admin access only".to_string()).into());
        }
        Ok(Self(user))
    }
}

// =============================================================================
// TESTS
// =============================================================================
