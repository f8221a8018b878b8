//! # Lifecycle Evaluator
//!
//! Derived status computation for the three capacity-bound document kinds.
//!
//! | Document        | Status          | Derived from                            |
//! |-----------------|-----------------|-----------------------------------------|
//! | `Event`         | `EventStatus`   | clock vs. `[start_date, end_date]`      |
//! | `MatchRequest`  | `TeamStatus`    | `selected_users.len()` vs. team size    |
//! | `ProjectPosting`| `ProjectStatus` | per-role selected headcount vs. counts  |
//!
//! The evaluators are total, pure functions. They are applied through the
//! [`BeforePersist`] stage, which the storage layer runs on every insert and
//! every update. A status value supplied by a caller is always overwritten, so
//! the stored field is a cache of the last evaluation and nothing else.

use crate::model::{College, Event, MatchRequest, ProjectPosting, RequiredRole, SelectedMember, User};
use crate::types::{EventStatus, ProjectStatus, TeamStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// =============================================================================
// EVALUATORS
// =============================================================================

/// Phase of an event window at `now`.
///
/// Both ends of the window are inclusive: an event is `Ongoing` at exactly
/// `start_date` and at exactly `end_date`.
#[must_use]
pub fn evaluate_event_status(
    now: DateTime<Utc>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> EventStatus {
    if now < start_date {
        EventStatus::Upcoming
    } else if now <= end_date {
        EventStatus::Ongoing
    } else {
        EventStatus::Past
    }
}

/// Whether a membership set of `registered_count` has reached `max_participants`.
///
/// Governs join eligibility only; it never changes an event's status.
#[must_use]
pub fn is_full(registered_count: usize, max_participants: u32) -> bool {
    registered_count >= max_participants as usize
}

/// Fill state of a team: `Matched` once the selected headcount reaches the team size.
#[must_use]
pub fn evaluate_team_status(selected_count: usize, max_team_size: u32) -> TeamStatus {
    if is_full(selected_count, max_team_size) {
        TeamStatus::Matched
    } else {
        TeamStatus::Pending
    }
}

/// Fill state of a project: `Closed` iff every required role has enough members.
///
/// Selected members with a blank role count toward nothing. Required roles are
/// checked in list order and the first short role returns `Open`. An empty
/// requirement list is vacuously `Closed`.
#[must_use]
pub fn evaluate_project_status(
    required_roles: &[RequiredRole],
    selected_users: &[SelectedMember],
) -> ProjectStatus {
    let filled = role_counts(selected_users);

    for required in required_roles {
        let current = filled.get(required.role.as_str()).copied().unwrap_or(0);
        if current < required.count as usize {
            return ProjectStatus::Open;
        }
    }

    ProjectStatus::Closed
}

/// Number of selected members holding each non-blank role.
#[must_use]
pub fn role_counts(selected_users: &[SelectedMember]) -> BTreeMap<&str, usize> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for member in selected_users {
        let role = member.role.trim();
        if role.is_empty() {
            continue;
        }
        *counts.entry(role).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
// BEFORE-PERSIST STAGE
// =============================================================================

/// The stage every document passes through immediately before it is written.
///
/// Implementations recompute derived fields and stamp `updated_at`. The
/// storage layer calls this on insert and on every update, with the instant
/// of the write, never the instant the document was created.
pub trait BeforePersist {
    fn before_persist(&mut self, now: DateTime<Utc>);
}

impl BeforePersist for Event {
    fn before_persist(&mut self, now: DateTime<Utc>) {
        self.event_status = evaluate_event_status(now, self.start_date, self.end_date);
        self.updated_at = now;
    }
}

impl BeforePersist for MatchRequest {
    fn before_persist(&mut self, now: DateTime<Utc>) {
        self.status = evaluate_team_status(self.selected_users.len(), self.max_team_size);
        self.updated_at = now;
    }
}

impl BeforePersist for ProjectPosting {
    fn before_persist(&mut self, now: DateTime<Utc>) {
        self.status = evaluate_project_status(&self.required_roles, &self.selected_users);
        self.updated_at = now;
    }
}

impl BeforePersist for User {
    fn before_persist(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl BeforePersist for College {
    fn before_persist(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// =============================================================================
// TESTS
// =============================================================================
