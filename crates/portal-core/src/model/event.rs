use crate::types::{CollegeId, EventId, EventStatus, EventTag, EventType, PortalError, UserId};
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A campus event with a time window and a bounded participant set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub tags: Vec<EventTag>,
    pub event_type: EventType,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_by: UserId,
    pub college: CollegeId,
    pub max_participants: u32,
    pub registered_users: Vec<UserId>,
    /// Derived from the clock on every save.
    pub event_status: EventStatus,
    pub registration_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Cross-field checks shared by creation and update.
    fn check(&self) -> Result<(), PortalError> {
        if self.tags.is_empty() {
            return Err(PortalError::Validation(
                "At least one tag is required".to_string(),
            ));
        }
        if self.event_type.requires_location() && self.location.trim().is_empty() {
            return Err(PortalError::Validation(
                "Location is required for In-Person or Hybrid events.".to_string(),
            ));
        }
        if self.start_date > self.end_date {
            return Err(PortalError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }
        validation::capacity("maxParticipants", self.max_participants)?;
        if self.registered_users.len() > self.max_participants as usize {
            return Err(PortalError::Validation(
                "maxParticipants cannot be lower than the number of registered users".to_string(),
            ));
        }
        Ok(())
    }
}

/// Event creation draft. The creator comes from the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub tags: Vec<EventTag>,
    pub event_type: EventType,
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub college: CollegeId,
    pub max_participants: u32,
    pub registration_link: Option<String>,
}

impl NewEvent {
    pub fn into_event(self, created_by: UserId, now: DateTime<Utc>) -> Result<Event, PortalError> {
        let mut tags = self.tags;
        tags.sort();
        tags.dedup();

        let event = Event {
            id: EventId::generate(),
            title: validation::required_text("Title", &self.title)?,
            description: validation::required_long_text("Description", &self.description)?,
            tags,
            event_type: self.event_type,
            location: validation::optional_text("location", self.location.as_deref())?
                .unwrap_or_default(),
            start_date: self.start_date,
            end_date: self.end_date,
            created_by,
            college: self.college,
            max_participants: self.max_participants,
            registered_users: Vec::new(),
            event_status: EventStatus::default(),
            registration_link: validation::optional_text(
                "registrationLink",
                self.registration_link.as_deref(),
            )?,
            created_at: now,
            updated_at: now,
        };
        event.check()?;
        Ok(event)
    }
}

/// Partial event update. Membership and status are not patchable.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
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

impl EventPatch {
    pub fn apply(self, event: &mut Event) -> Result<(), PortalError> {
        if let Some(title) = self.title {
            event.title = validation::required_text("Title", &title)?;
        }
        if let Some(description) = self.description {
            event.description = validation::required_long_text("Description", &description)?;
        }
        if let Some(mut tags) = self.tags {
            tags.sort();
            tags.dedup();
            event.tags = tags;
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(location) = self.location {
            event.location =
                validation::optional_text("location", Some(&location))?.unwrap_or_default();
        }
        if let Some(start) = self.start_date {
            event.start_date = start;
        }
        if let Some(end) = self.end_date {
            event.end_date = end;
        }
        if let Some(college) = self.college {
            event.college = college;
        }
        if let Some(max) = self.max_participants {
            event.max_participants = max;
        }
        if let Some(link) = self.registration_link {
            event.registration_link = validation::optional_text("registrationLink", Some(&link))?;
        }
        event.check()
    }
}
