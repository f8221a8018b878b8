//! # API Endpoint Handlers
//!
//! One submodule per resource. Handlers translate HTTP into `Portal` calls
//! and back; every rule lives in `portal-core`.

pub mod colleges;
pub mod events;
pub mod matches;
pub mod projects;
pub mod users;

use super::{error::ApiError, types::HealthResponse};
use axum::{Json, response::IntoResponse};
use portal_core::PortalError;
use std::str::FromStr;

/// Banner for `GET /`.
pub async fn root_handler() -> &'static str {
    "One Portal API is running"
}

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Parse a path segment into a document id.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = PortalError>,
{
    raw.parse().map_err(ApiError::from)
}
