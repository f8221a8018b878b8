//! `/api/users` handlers: registration, login and profile management.

use super::parse_id;
use crate::api::{
    AppState,
    auth::{AdminUser, AuthUser, hash_password, verify_password},
    error::ApiError,
    json::ApiJson,
    types::{
        AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UpdateUserRequest,
        UserResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use portal_core::{NewUser, UserId, validation};

/// Register an account and sign the caller in.
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validation::password(&req.password, req.confirm_password.as_deref())?;
    let password_hash = hash_password(&req.password)?;

    let user = state.portal.register_user(NewUser {
        name: req.name,
        username: req.username,
        email: req.email,
        password_hash,
        role: req.role.unwrap_or_default(),
        is_admin: false,
        college: req.college,
        resume_link: req.resume_link,
        github_profile: req.github_profile,
        interests: req.interests,
        skills: req.skills,
    })?;
    let token = state.tokens.issue(&user)?;
    tracing::info!(user = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
            token,
        }),
    ))
}

/// Exchange email and password for a token.
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .portal
        .find_user_by_email(&req.email)?
        .filter(|user| verify_password(&req.password, &user.password_hash));

    let Some(user) = user else {
        tracing::warn!(
            event = "auth_failure",
            reason = "invalid_credentials",
            "Login failed"
        );
        return Err(ApiError::Unauthorized("Invalid credentials"));
    };

    let token = state.tokens.issue(&user)?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: user.into(),
        token,
    }))
}

pub async fn profile_handler(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.portal.list_users()?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Update a profile. Self or admin; `isAdmin` is admin-only.
pub async fn update_user_handler(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    ApiJson(mut req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id: UserId = parse_id(&id)?;
    let password_hash = match req.password.take() {
        Some(password) => {
            validation::password(&password, None)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };
    let user = state
        .portal
        .update_user(caller.actor(), id, req.into_patch(password_hash))?;
    Ok(Json(user.into()))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: UserId = parse_id(&id)?;
    state.portal.delete_user(admin.actor(), id)?;
    tracing::info!(user = %id, by = %admin.0.id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
