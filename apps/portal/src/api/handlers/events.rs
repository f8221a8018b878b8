//! `/api/events` handlers.

use super::parse_id;
use crate::api::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    json::ApiJson,
    types::{CreateEventRequest, EventQuery, MessageResponse, UpdateEventRequest},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use portal_core::{Event, EventId, MatchRequest};

/// List events, newest first. Filters: `tag`, `location`, `college`,
/// `status`, and `q` for title words.
pub async fn list_events_handler(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let filter = query.into_filter()?;
    Ok(Json(state.portal.list_events(&filter)?))
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.portal.create_event(caller.actor(), req.into())?;
    tracing::info!(event_id = %event.id, host = %caller.0.id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Events the caller has joined.
pub async fn my_events_handler(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.portal.my_events(caller.0.id)?))
}

pub async fn get_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id: EventId = parse_id(&id)?;
    Ok(Json(state.portal.get_event(id)?))
}

pub async fn update_event_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let id: EventId = parse_id(&id)?;
    Ok(Json(state.portal.update_event(caller.actor(), id, req.into())?))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: EventId = parse_id(&id)?;
    state.portal.delete_event(caller.actor(), id)?;
    tracing::info!(event_id = %id, by = %caller.0.id, "Event deleted");
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

/// Join an event.
pub async fn register_event_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id: EventId = parse_id(&id)?;
    let event = state
        .portal
        .register_for_event(caller.actor(), id)
        .map_err(ApiError::EventMembership)?;
    Ok(Json(event))
}

pub async fn leave_event_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id: EventId = parse_id(&id)?;
    let event = state
        .portal
        .leave_event(caller.actor(), id)
        .map_err(ApiError::EventMembership)?;
    Ok(Json(event))
}

/// Match requests posted for one event, newest first.
pub async fn event_matches_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MatchRequest>>, ApiError> {
    let id: EventId = parse_id(&id)?;
    Ok(Json(state.portal.list_match_requests_for_event(id)?))
}
