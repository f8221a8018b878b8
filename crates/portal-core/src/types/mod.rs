//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of One Portal:
//! - Document identifiers (`UserId`, `CollegeId`, `EventId`, `MatchRequestId`, `ProjectId`)
//! - Enumerations with a fixed value set (`EventTag`, `EventType`, `UserRole`, `Weekday`)
//! - Derived status tags (`EventStatus`, `TeamStatus`, `ProjectStatus`)
//! - The caller identity used for authorization (`Actor`)
//! - Error types (`PortalError`)
//!
//! Every enum serializes to the exact strings the HTTP clients send and receive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// DOCUMENT IDENTIFIERS
// =============================================================================

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// The 128-bit storage key for this identifier.
            #[must_use]
            pub const fn as_u128(&self) -> u128 {
                self.0.as_u128()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = PortalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| PortalError::Validation(format!("Invalid id: {}", s)))
            }
        }
    };
}

document_id!(
    /// Identifier of a registered user.
    UserId
);
document_id!(
    /// Identifier of a college.
    CollegeId
);
document_id!(
    /// Identifier of an event.
    EventId
);
document_id!(
    /// Identifier of a team-matching request.
    MatchRequestId
);
document_id!(
    /// Identifier of a project posting.
    ProjectId
);

// =============================================================================
// FIXED VALUE SETS
// =============================================================================

/// Category tags an event may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventTag {
    Hackathon,
    #[serde(rename = "AI")]
    Ai,
    Sports,
    Workshop,
    Debate,
    Coding,
}

impl FromStr for EventTag {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Hackathon" => Ok(Self::Hackathon),
            "AI" => Ok(Self::Ai),
            "Sports" => Ok(Self::Sports),
            "Workshop" => Ok(Self::Workshop),
            "Debate" => Ok(Self::Debate),
            "Coding" => Ok(Self::Coding),
            other => Err(PortalError::Validation(format!("Unknown event tag: {}", other))),
        }
    }
}

/// How an event is attended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Virtual,
    #[serde(rename = "In-Person")]
    InPerson,
    Hybrid,
}

impl EventType {
    /// Whether events of this type must carry a physical location.
    #[must_use]
    pub const fn requires_location(self) -> bool {
        matches!(self, Self::InPerson | Self::Hybrid)
    }
}

/// Account kind of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    Student,
    Club,
}

/// Day of week used in project availability slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

// =============================================================================
// DERIVED STATUS TAGS
// =============================================================================

/// Lifecycle phase of an event, derived from the clock and the event window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Past,
}

impl FromStr for EventStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Upcoming" => Ok(Self::Upcoming),
            "Ongoing" => Ok(Self::Ongoing),
            "Past" => Ok(Self::Past),
            other => Err(PortalError::Validation(format!("Unknown event status: {}", other))),
        }
    }
}

/// Fill state of a team-matching request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TeamStatus {
    #[default]
    Pending,
    Matched,
}

/// Fill state of a project posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Open,
    Closed,
}

impl FromStr for ProjectStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Open" => Ok(Self::Open),
            "Closed" => Ok(Self::Closed),
            other => Err(PortalError::Validation(format!(
                "Unknown project status: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// ACTOR
// =============================================================================

/// The authenticated identity on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    #[must_use]
    pub const fn new(user_id: UserId, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }

    /// Owner-or-admin gate used by update and delete paths.
    pub fn ensure_owner_or_admin(&self, owner: UserId, action: &str) -> Result<(), PortalError> {
        if self.is_admin || self.user_id == owner {
            Ok(())
        } else {
            Err(PortalError::Authorization(format!(
                "Only the owner or an admin can {}",
                action
            )))
        }
    }

    /// Owner-only gate used by selection paths.
    pub fn ensure_owner(&self, owner: UserId, action: &str) -> Result<(), PortalError> {
        if self.user_id == owner {
            Ok(())
        } else {
            Err(PortalError::Authorization(format!(
                "Only the owner can {}",
                action
            )))
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in One Portal operations.
///
/// The lifecycle evaluators never produce these; they originate in
/// validation, membership decisions, authorization gates and storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The referenced document does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The identity is already present in the membership set.
    #[error("Already a member")]
    DuplicateMembership,

    /// The membership set is full.
    #[error("Capacity exceeded")]
    CapacityExceeded,

    /// The identity is not present in the membership set it should leave.
    #[error("Not a member")]
    NotAMember,

    /// A unique field value is already taken by another document.
    #[error("{}", duplicate_key_message(.field, .value))]
    DuplicateKey { field: &'static str, value: String },

    /// The caller lacks the capability or ownership for this operation.
    #[error("Forbidden: {0}")]
    Authorization(String),

    /// The storage engine failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn duplicate_key_message(field: &str, value: &str) -> String {
    match field {
        "email" => "Email already registered".to_string(),
        "username" => "Username already taken".to_string(),
        "domain" => format!("A college with domain {} already exists", value),
        _ => format!("Duplicate {}: {}", field, value),
    }
}

impl PortalError {
    pub(crate) fn not_found(kind: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
