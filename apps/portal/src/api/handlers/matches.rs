//! `/api/matches` handlers.

use super::parse_id;
use crate::api::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    json::ApiJson,
    types::{ApplyToMatchRequest, CreateMatchRequest, MemberRequest, MessageResponse},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use portal_core::{MatchRequest, MatchRequestId};

pub async fn create_match_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchRequest>), ApiError> {
    let request = state.portal.create_match_request(caller.actor(), req.into())?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn get_match_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MatchRequest>, ApiError> {
    let id: MatchRequestId = parse_id(&id)?;
    Ok(Json(state.portal.get_match_request(id)?))
}

pub async fn delete_match_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: MatchRequestId = parse_id(&id)?;
    state.portal.delete_match_request(caller.actor(), id)?;
    Ok(Json(MessageResponse::new("Match request deleted successfully")))
}

pub async fn apply_match_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ApplyToMatchRequest>,
) -> Result<Json<MatchRequest>, ApiError> {
    let id: MatchRequestId = parse_id(&id)?;
    let request = state.portal.apply_to_match(
        caller.actor(),
        id,
        req.role.as_deref(),
        req.description.as_deref(),
    )?;
    Ok(Json(request))
}

/// Owner picks an applicant into the team.
pub async fn select_match_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MemberRequest>,
) -> Result<Json<MatchRequest>, ApiError> {
    let id: MatchRequestId = parse_id(&id)?;
    let request = state.portal.select_match_member(caller.actor(), id, req.user)?;
    tracing::info!(
        match_id = %id,
        user = %req.user,
        status = ?request.status,
        "Team member selected"
    );
    Ok(Json(request))
}

pub async fn deselect_match_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MemberRequest>,
) -> Result<Json<MatchRequest>, ApiError> {
    let id: MatchRequestId = parse_id(&id)?;
    Ok(Json(state.portal.deselect_match_member(caller.actor(), id, req.user)?))
}
