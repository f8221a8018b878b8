//! `/api/projects` handlers.

use super::parse_id;
use crate::api::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    json::ApiJson,
    types::{
        ApplyToProjectRequest, CreateProjectRequest, MemberRequest, MessageResponse, ProjectQuery,
        SelectProjectMemberRequest, UpdateProjectRequest,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use portal_core::{ProjectId, ProjectPosting};

/// List projects, newest first. Filters: `status`, and `q` for title words.
pub async fn list_projects_handler(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<Vec<ProjectPosting>>, ApiError> {
    let filter = query.into_filter()?;
    Ok(Json(state.portal.list_projects(&filter)?))
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectPosting>), ApiError> {
    let project = state.portal.create_project(caller.actor(), req.into())?;
    tracing::info!(project_id = %project.id, owner = %caller.0.id, "Project posted");
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectPosting>, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    Ok(Json(state.portal.get_project(id)?))
}

pub async fn update_project_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> Result<Json<ProjectPosting>, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    Ok(Json(state.portal.update_project(caller.actor(), id, req.into())?))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    state.portal.delete_project(caller.actor(), id)?;
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

pub async fn apply_project_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ApplyToProjectRequest>,
) -> Result<Json<ProjectPosting>, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    let project = state
        .portal
        .apply_to_project(caller.actor(), id, req.message.as_deref())?;
    Ok(Json(project))
}

/// Owner assigns an applicant to one of the required roles.
pub async fn select_project_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SelectProjectMemberRequest>,
) -> Result<Json<ProjectPosting>, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    let project = state
        .portal
        .select_project_member(caller.actor(), id, req.user, &req.role)?;
    tracing::info!(
        project_id = %id,
        user = %req.user,
        role = %req.role,
        status = ?project.status,
        "Project member selected"
    );
    Ok(Json(project))
}

pub async fn deselect_project_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MemberRequest>,
) -> Result<Json<ProjectPosting>, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    Ok(Json(state.portal.deselect_project_member(caller.actor(), id, req.user)?))
}
