use crate::types::{CollegeId, EventId, PortalError, UserId, UserRole};
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account.
///
/// `password_hash` is stored with the document but must never leave the
/// server; the HTTP layer renders users through its own response type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
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

impl User {
    /// Record an event the user joined. Set semantics.
    pub fn add_participated_event(&mut self, event: EventId) {
        if !self.participated_events.contains(&event) {
            self.participated_events.push(event);
        }
    }

    /// Record an event the user created. Set semantics.
    pub fn add_hosted_event(&mut self, event: EventId) {
        if !self.hosted_events.contains(&event) {
            self.hosted_events.push(event);
        }
    }

    /// Drop every reference to `event`.
    pub fn forget_event(&mut self, event: EventId) {
        self.participated_events.retain(|e| *e != event);
        self.hosted_events.retain(|e| *e != event);
    }
}

/// Registration draft. The password arrives already hashed.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_admin: bool,
    pub college: Option<CollegeId>,
    pub resume_link: Option<String>,
    pub github_profile: Option<String>,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
}

impl NewUser {
    /// Validate the draft and build the document.
    pub fn into_user(self, now: DateTime<Utc>) -> Result<User, PortalError> {
        if self.password_hash.is_empty() {
            return Err(PortalError::Validation("password is required".to_string()));
        }
        Ok(User {
            id: UserId::generate(),
            name: validation::required_text("name", &self.name)?,
            username: validation::username(&self.username)?,
            email: validation::email(&self.email)?,
            password_hash: self.password_hash,
            role: self.role,
            is_admin: self.is_admin,
            college: self.college,
            resume_link: validation::optional_text("resumeLink", self.resume_link.as_deref())?,
            github_profile: validation::github_profile(self.github_profile.as_deref())?,
            interests: validation::text_list("interests", &self.interests)?,
            skills: validation::text_list("skills", &self.skills)?,
            participated_events: Vec::new(),
            hosted_events: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub is_admin: Option<bool>,
    pub college: Option<CollegeId>,
    pub resume_link: Option<String>,
    pub github_profile: Option<String>,
    pub interests: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
}

impl UserPatch {
    /// Whether applying the patch would flip `user`'s admin flag.
    pub fn changes_admin(&self, user: &User) -> bool {
        self.is_admin.is_some_and(|flag| flag != user.is_admin)
    }

    pub fn apply(self, user: &mut User) -> Result<(), PortalError> {
        if let Some(name) = self.name {
            user.name = validation::required_text("name", &name)?;
        }
        if let Some(username) = self.username {
            user.username = validation::username(&username)?;
        }
        if let Some(email) = self.email {
            user.email = validation::email(&email)?;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_admin) = self.is_admin {
            user.is_admin = is_admin;
        }
        if let Some(college) = self.college {
            user.college = Some(college);
        }
        if let Some(link) = self.resume_link {
            user.resume_link = validation::optional_text("resumeLink", Some(&link))?;
        }
        if let Some(link) = self.github_profile {
            user.github_profile = validation::github_profile(Some(&link))?;
        }
        if let Some(interests) = self.interests {
            user.interests = validation::text_list("interests", &interests)?;
        }
        if let Some(skills) = self.skills {
            user.skills = validation::text_list("skills", &skills)?;
        }
        Ok(())
    }
}
