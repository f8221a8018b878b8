//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. Field names are
//! camelCase on the wire. Request types carry no status fields, so a client
//! sending `status` or `eventStatus` has it silently dropped.

use chrono::{DateTime, Utc};
use portal_core::{
    AvailabilitySlot, CollegeId, EventFilter, EventId, EventPatch, EventStatus, EventTag, EventType,
    NewCollege, NewEvent, NewMatchRequest, NewProject, PortalError, ProjectFilter, ProjectPatch,
    ProjectStatus, RequiredRole, User, UserId, UserPatch, UserRole,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Plain acknowledgement, used by delete routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

/// A user as clients see it. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_admin: bool,
    pub college: Option<CollegeId>,
    pub resume_link: Option<String>,
    pub github_profile: Option<String>,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub participated_events: Vec<EventId>,
    pub hosted_events: Vec<EventId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
            is_admin: user.is_admin,
            college: user.college,
            resume_link: user.resume_link,
            github_profile: user.github_profile,
            interests: user.interests,
            skills: user.skills,
            participated_events: user.participated_events,
            hosted_events: user.hosted_events,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

/// Self-registration. Admin rights are never granted here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub college: Option<CollegeId>,
    #[serde(default)]
    pub resume_link: Option<String>,
    #[serde(default)]
    pub github_profile: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile update. `password` is hashed before it reaches the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_admin: Option<bool>,
    pub college: Option<CollegeId>,
    pub resume_link: Option<String>,
    pub github_profile: Option<String>,
    pub interests: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
}

impl UpdateUserRequest {
    pub fn into_patch(self, password_hash: Option<String>) -> UserPatch {
        UserPatch {
            name: self.name,
            username: self.username,
            email: self.email,
            password_hash,
            role: self.role,
            is_admin: self.is_admin,
            college: self.college,
            resume_link: self.resume_link,
            github_profile: self.github_profile,
            interests: self.interests,
            skills: self.skills,
        }
    }
}

// =============================================================================
// COLLEGES
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCollegeRequest {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

impl From<CreateCollegeRequest> for NewCollege {
    fn from(req: CreateCollegeRequest) -> Self {
        Self {
            name: req.name,
            domain: req.domain,
            location: req.location,
            verified: req.verified,
        }
    }
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<EventTag>,
    pub event_type: EventType,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub college: CollegeId,
    pub max_participants: u32,
    #[serde(default)]
    pub registration_link: Option<String>,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            tags: req.tags,
            event_type: req.event_type,
            location: req.location,
            start_date: req.start_date,
            end_date: req.end_date,
            college: req.college,
            max_participants: req.max_participants,
            registration_link: req.registration_link,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<EventTag>>,
    pub event_type: Option<EventType>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub college: Option<CollegeId>,
    pub max_participants: Option<u32>,
    pub registration_link: Option<String>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            tags: req.tags,
            event_type: req.event_type,
            location: req.location,
            start_date: req.start_date,
            end_date: req.end_date,
            college: req.college,
            max_participants: req.max_participants,
            registration_link: req.registration_link,
        }
    }
}

/// `GET /api/events` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    pub tag: Option<String>,
    pub location: Option<String>,
    pub college: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
}

impl EventQuery {
    pub fn into_filter(self) -> Result<EventFilter, PortalError> {
        Ok(EventFilter {
            tag: non_blank(self.tag)
                .map(|t| t.parse::<EventTag>())
                .transpose()?,
            location: non_blank(self.location),
            college: non_blank(self.college)
                .map(|c| c.parse::<CollegeId>())
                .transpose()?,
            status: non_blank(self.status)
                .map(|s| s.parse::<EventStatus>())
                .transpose()?,
            query: non_blank(self.q),
        })
    }
}

// =============================================================================
// MATCH REQUESTS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub event: EventId,
    pub max_team_size: u32,
    #[serde(default)]
    pub looking_for_roles: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl From<CreateMatchRequest> for NewMatchRequest {
    fn from(req: CreateMatchRequest) -> Self {
        Self {
            event: req.event,
            max_team_size: req.max_team_size,
            looking_for_roles: req.looking_for_roles,
            skills: req.skills,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplyToMatchRequest {
    pub role: Option<String>,
    pub description: Option<String>,
}

/// Body of the match select/deselect routes and of project deselect.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRequest {
    pub user: UserId,
}

// =============================================================================
// PROJECTS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_roles: Vec<RequiredRole>,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
}

impl From<CreateProjectRequest> for NewProject {
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            required_roles: req.required_roles,
            availability: req.availability,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required_roles: Option<Vec<RequiredRole>>,
    pub availability: Option<Vec<AvailabilitySlot>>,
}

impl From<UpdateProjectRequest> for ProjectPatch {
    fn from(req: UpdateProjectRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            required_roles: req.required_roles,
            availability: req.availability,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplyToProjectRequest {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectProjectMemberRequest {
    pub user: UserId,
    pub role: String,
}

/// `GET /api/projects` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

impl ProjectQuery {
    pub fn into_filter(self) -> Result<ProjectFilter, PortalError> {
        Ok(ProjectFilter {
            status: non_blank(self.status)
                .map(|s| s.parse::<ProjectStatus>())
                .transpose()?,
            query: non_blank(self.q),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// TESTS
// =============================================================================
