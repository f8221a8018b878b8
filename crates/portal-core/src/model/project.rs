use crate::primitives::MAX_LIST_LENGTH;
use crate::types::{PortalError, ProjectId, ProjectStatus, UserId, Weekday};
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A project looking for members in specific roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPosting {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub posted_by: UserId,
    pub required_roles: Vec<RequiredRole>,
    pub applicants: Vec<ProjectApplicant>,
    pub availability: Vec<AvailabilitySlot>,
    pub selected_users: Vec<SelectedMember>,
    /// Derived from per-role headcounts on every save.
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How many members a role needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredRole {
    pub role: String,
    pub description: Option<String>,
    pub count: u32,
}

impl RequiredRole {
    pub fn new(role: &str, count: u32) -> Self {
        Self {
            role: role.to_string(),
            description: None,
            count,
        }
    }
}

/// A selected member and the role they fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedMember {
    pub user: UserId,
    pub role: String,
}

impl SelectedMember {
    pub fn new(user: UserId, role: &str) -> Self {
        Self {
            user,
            role: role.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApplicant {
    pub user: UserId,
    pub message: Option<String>,
    pub applied_at: DateTime<Utc>,
}

/// A weekly slot in which the team can meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub day: Weekday,
    /// `HH:MM-HH:MM`
    pub time: String,
}

/// Project creation draft.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub required_roles: Vec<RequiredRole>,
    pub availability: Vec<AvailabilitySlot>,
}

impl NewProject {
    pub fn into_project(
        self,
        posted_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<ProjectPosting, PortalError> {
        Ok(ProjectPosting {
            id: ProjectId::generate(),
            title: validation::required_text("Project title", &self.title)?,
            description: validation::required_long_text("Project description", &self.description)?,
            posted_by,
            required_roles: normalize_roles(self.required_roles)?,
            applicants: Vec::new(),
            availability: normalize_availability(self.availability)?,
            selected_users: Vec::new(),
            status: ProjectStatus::default(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial project update. Selection and status are not patchable.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required_roles: Option<Vec<RequiredRole>>,
    pub availability: Option<Vec<AvailabilitySlot>>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut ProjectPosting) -> Result<(), PortalError> {
        if let Some(title) = self.title {
            project.title = validation::required_text("Project title", &title)?;
        }
        if let Some(description) = self.description {
            project.description =
                validation::required_long_text("Project description", &description)?;
        }
        if let Some(roles) = self.required_roles {
            project.required_roles = normalize_roles(roles)?;
        }
        if let Some(slots) = self.availability {
            project.availability = normalize_availability(slots)?;
        }
        Ok(())
    }
}

/// Trim role keys, require positive counts, reject repeated keys.
fn normalize_roles(roles: Vec<RequiredRole>) -> Result<Vec<RequiredRole>, PortalError> {
    if roles.len() > MAX_LIST_LENGTH {
        return Err(PortalError::Validation(format!(
            "requiredRoles accepts at most {} entries",
            MAX_LIST_LENGTH
        )));
    }
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(roles.len());
    for required in roles {
        let role = validation::required_text("Role", &required.role)?;
        if !seen.insert(role.clone()) {
            return Err(PortalError::Validation(format!(
                "Role '{}' is listed more than once",
                role
            )));
        }
        out.push(RequiredRole {
            role,
            description: validation::optional_long_text(
                "role description",
                required.description.as_deref(),
            )?,
            count: validation::capacity("Count", required.count)?,
        });
    }
    Ok(out)
}

fn normalize_availability(
    slots: Vec<AvailabilitySlot>,
) -> Result<Vec<AvailabilitySlot>, PortalError> {
    if slots.len() > MAX_LIST_LENGTH {
        return Err(PortalError::Validation(format!(
            "availability accepts at most {} entries",
            MAX_LIST_LENGTH
        )));
    }
    slots
        .into_iter()
        .map(|slot| {
            Ok(AvailabilitySlot {
                day: slot.day,
                time: validation::time_range(&slot.time)?,
            })
        })
        .collect()
}
