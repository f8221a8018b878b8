use crate::types::{EventId, MatchRequestId, PortalError, TeamStatus, UserId};
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request to assemble a team for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub id: MatchRequestId,
    /// The user who posted the request and selects the team.
    pub user: UserId,
    pub event: EventId,
    pub max_team_size: u32,
    pub looking_for_roles: Vec<String>,
    pub skills: Vec<String>,
    pub applicants: Vec<MatchApplicant>,
    pub selected_users: Vec<UserId>,
    /// Derived from the selected headcount on every save.
    pub status: TeamStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One application to a match request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchApplicant {
    pub user: UserId,
    pub role: Option<String>,
    pub description: Option<String>,
    pub applied_at: DateTime<Utc>,
}

impl MatchApplicant {
    pub fn new(
        user: UserId,
        role: Option<&str>,
        description: Option<&str>,
        applied_at: DateTime<Utc>,
    ) -> Result<Self, PortalError> {
        Ok(Self {
            user,
            role: validation::optional_text("role", role)?,
            description: validation::optional_long_text("description", description)?,
            applied_at,
        })
    }
}

/// Match request creation draft.
#[derive(Debug, Clone)]
pub struct NewMatchRequest {
    pub event: EventId,
    pub max_team_size: u32,
    pub looking_for_roles: Vec<String>,
    pub skills: Vec<String>,
}

impl NewMatchRequest {
    pub fn into_match_request(
        self,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<MatchRequest, PortalError> {
        Ok(MatchRequest {
            id: MatchRequestId::generate(),
            user: owner,
            event: self.event,
            max_team_size: validation::capacity("maxTeamSize", self.max_team_size)?,
            looking_for_roles: validation::text_list("lookingForRoles", &self.looking_for_roles)?,
            skills: validation::text_list("skills", &self.skills)?,
            applicants: Vec::new(),
            selected_users: Vec::new(),
            status: TeamStatus::default(),
            created_at: now,
            updated_at: now,
        })
    }
}
