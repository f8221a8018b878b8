//! JSON body extractor that reports malformed bodies in the API error shape.

use super::error::ApiError;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use portal_core::PortalError;
use serde::de::DeserializeOwned;

/// Like [`axum::Json`], but a body that fails to parse becomes a 400
/// `Validation` error instead of axum's plain-text rejection.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(PortalError::Validation(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))
            .into()),
        }
    }
}
