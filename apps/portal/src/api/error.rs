//! # API Errors
//!
//! Maps [`PortalError`] onto HTTP status codes. Every error body has the
//! shape `{"error": <message>, "status": <code>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portal_core::PortalError;
use serde_json::json;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unusable bearer token.
    Unauthorized(&'static str),
    /// A failure from the rules engine or the store.
    Portal(PortalError),
    /// A join or leave on an event; membership failures use attendee wording.
    EventMembership(PortalError),
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Portal(err) | Self::EventMembership(err) => match err {
                PortalError::Validation(_)
                | PortalError::DuplicateMembership
                | PortalError::CapacityExceeded
                | PortalError::NotAMember
                | PortalError::DuplicateKey { .. } => StatusCode::BAD_REQUEST,
                PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
                PortalError::Authorization(_) => StatusCode::FORBIDDEN,
                PortalError::Storage(_) | PortalError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Unauthorized(reason) => (*reason).to_string(),
            Self::Portal(err) => err.to_string(),
            Self::EventMembership(err) => match err {
                PortalError::DuplicateMembership => {
                    "You are already registered for this event".to_string()
                }
                PortalError::CapacityExceeded => "This event is full".to_string(),
                PortalError::NotAMember => "You are not registered for this event".to_string(),
                other => other.to_string(),
            },
        }
    }
}

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        Self::Portal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else if matches!(
            self,
            Self::Portal(PortalError::DuplicateMembership | PortalError::CapacityExceeded)
                | Self::EventMembership(
                    PortalError::DuplicateMembership | PortalError::CapacityExceeded
                )
        ) {
            tracing::info!(event = "membership_rejected", reason = %message);
        }

        let body = json!({
            "error": message,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================
