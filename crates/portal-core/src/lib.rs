//! # portal-core
//!
//! The business rules of One Portal: campus events, team-matching requests
//! and project postings.
//!
//! This crate implements the CORE of the service:
//! - The document model and its validation
//! - The lifecycle evaluators that derive `eventStatus` and fill statuses
//! - Membership decisions (join, apply, select) with capacity checks
//! - Document storage over redb, with an atomic read-modify-write
//!
//! ## Architectural Constraints
//!
//! - Derived statuses are computed here and nowhere else
//! - Every write passes through the before-persist stage
//! - Has NO async, NO network dependencies, NO logging (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod clock;
pub mod lifecycle;
pub mod membership;
pub mod model;
pub mod portal;
pub mod primitives;
pub mod search;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Actor, CollegeId, EventId, EventStatus, EventTag, EventType, MatchRequestId, PortalError,
    ProjectId, ProjectStatus, TeamStatus, UserId, UserRole, Weekday,
};

// =============================================================================
// RE-EXPORTS: Documents
// =============================================================================

pub use model::{
    AvailabilitySlot, College, Event, EventPatch, MatchApplicant, MatchRequest, NewCollege,
    NewEvent, NewMatchRequest, NewProject, NewUser, ProjectApplicant, ProjectPatch,
    ProjectPosting, RequiredRole, SelectedMember, User, UserPatch,
};

// =============================================================================
// RE-EXPORTS: Lifecycle & Service
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use lifecycle::{
    BeforePersist, evaluate_event_status, evaluate_project_status, evaluate_team_status, is_full,
};
pub use portal::{EventFilter, Portal, ProjectFilter};
pub use storage::{Document, DocumentStore, MemoryStore, RedbStore, StorageBackend};
