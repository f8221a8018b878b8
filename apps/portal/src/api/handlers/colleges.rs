//! `/api/colleges` handlers.

use crate::api::{
    AppState, auth::AdminUser, error::ApiError, json::ApiJson, types::CreateCollegeRequest,
};
use axum::{Json, extract::State, http::StatusCode};
use portal_core::College;

pub async fn list_colleges_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<College>>, ApiError> {
    Ok(Json(state.portal.list_colleges()?))
}

pub async fn create_college_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(req): ApiJson<CreateCollegeRequest>,
) -> Result<(StatusCode, Json<College>), ApiError> {
    let college = state.portal.create_college(admin.actor(), req.into())?;
    tracing::info!(college = %college.id, domain = %college.domain, "College created");
    Ok((StatusCode::CREATED, Json(college)))
}
