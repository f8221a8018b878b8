//! # Documents
//!
//! The five document kinds One Portal persists, with their construction drafts
//! (`New*`) and partial updates (`*Patch`).
//!
//! Drafts and patches validate and normalize their input. Derived status fields
//! are never part of a draft or patch: they are filled in by the before-persist
//! stage in [`crate::lifecycle`].

mod college;
mod event;
mod match_request;
mod project;
mod user;

pub use college::{College, NewCollege};
pub use event::{Event, EventPatch, NewEvent};
pub use match_request::{MatchApplicant, MatchRequest, NewMatchRequest};
pub use project::{
    AvailabilitySlot, NewProject, ProjectApplicant, ProjectPatch, ProjectPosting, RequiredRole,
    SelectedMember,
};
pub use user::{NewUser, User, UserPatch};
