//! # Configuration
//!
//! Server settings, resolved in three layers: an optional TOML file, then
//! `PORTAL_*` environment variables, then command-line flags.
//!
//! ## Environment Variables
//!
//! - `PORTAL_HOST`, `PORTAL_PORT`: bind address
//! - `PORTAL_DATABASE`: path of the redb file
//! - `PORTAL_JWT_SECRET`: HS256 signing secret
//! - `PORTAL_TOKEN_TTL_HOURS`: bearer token lifetime
//! - `PORTAL_CORS_ORIGINS`: comma-separated origins, or "*" for all

use portal_core::PortalError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Signing secret used when none is configured. Development only.
pub const DEV_JWT_SECRET: &str = "one-portal-development-secret";

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: u32,
    pub cors_origins: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database: PathBuf::from("portal.redb"),
            jwt_secret: None,
            token_ttl_hours: 24,
            cors_origins: None,
        }
    }
}

impl PortalConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, PortalError> {
        toml::from_str(text)
            .map_err(|e| PortalError::Validation(format!("Invalid config file: {}", e)))
    }

    /// Read the file at `path` (when given) and apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, PortalError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    PortalError::Validation(format!(
                        "Cannot read config file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PORTAL_*` overrides from `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), PortalError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("PORTAL_HOST") {
            self.host = host;
        }
        if let Some(port) = get("PORTAL_PORT") {
            self.port = parse_number("PORTAL_PORT", &port)?;
        }
        if let Some(database) = get("PORTAL_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(secret) = get("PORTAL_JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(hours) = get("PORTAL_TOKEN_TTL_HOURS") {
            self.token_ttl_hours = parse_number("PORTAL_TOKEN_TTL_HOURS", &hours)?;
        }
        if let Some(origins) = get("PORTAL_CORS_ORIGINS") {
            self.cors_origins = Some(origins);
        }
        Ok(())
    }

    /// The configured signing secret, or the development fallback.
    pub fn jwt_secret_or_default(&self) -> &str {
        match self.jwt_secret.as_deref() {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "PORTAL_JWT_SECRET is not set, signing tokens with the development secret"
                );
                DEV_JWT_SECRET
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, PortalError> {
    value
        .trim()
        .parse()
        .map_err(|_| PortalError::Validation(format!("{} must be a number, got '{}'", key, value)))
}

// =============================================================================
// TESTS
// =============================================================================
