//! # Membership Decisions
//!
//! Accept/reject decisions for joining, applying to and selecting into the
//! three capacity-bound documents. Each operation works on an in-memory
//! snapshot and either mutates it or returns the reason for rejection:
//!
//! - `DuplicateMembership`: the identity is already in the set
//! - `CapacityExceeded`: the set (or the role) is full
//! - `NotAMember`: removal of an identity that is not in the set
//! - `Validation`: the request itself is malformed (own posting, unknown role, no application)
//!
//! Duplicate checks always run before capacity checks, so a member retrying a
//! join on a full event is told they are already registered.
//!
//! These functions do not touch the derived status fields. The storage layer
//! runs the before-persist stage after the decision and before the write, all
//! inside one atomic read-modify-write.

use crate::lifecycle::{evaluate_project_status, evaluate_team_status, is_full, role_counts};
use crate::model::{Event, MatchApplicant, MatchRequest, ProjectApplicant, ProjectPosting, SelectedMember};
use crate::types::{PortalError, ProjectStatus, TeamStatus, UserId};
use crate::validation;

// =============================================================================
// EVENT
// =============================================================================

impl Event {
    pub fn is_registered(&self, user: UserId) -> bool {
        self.registered_users.contains(&user)
    }

    pub fn is_full(&self) -> bool {
        is_full(self.registered_users.len(), self.max_participants)
    }

    /// Add `user` to the participant set.
    pub fn register(&mut self, user: UserId) -> Result<(), PortalError> {
        if self.is_registered(user) {
            return Err(PortalError::DuplicateMembership);
        }
        if self.is_full() {
            return Err(PortalError::CapacityExceeded);
        }
        self.registered_users.push(user);
        Ok(())
    }

    /// Remove `user` from the participant set.
    pub fn leave(&mut self, user: UserId) -> Result<(), PortalError> {
        if !self.is_registered(user) {
            return Err(PortalError::NotAMember);
        }
        self.registered_users.retain(|u| *u != user);
        Ok(())
    }

    /// Drop every trace of `user`. Returns whether anything was removed.
    pub fn release(&mut self, user: UserId) -> bool {
        let before = self.registered_users.len();
        self.registered_users.retain(|u| *u != user);
        self.registered_users.len() != before
    }
}

// =============================================================================
// MATCH REQUEST
// =============================================================================

impl MatchRequest {
    pub fn is_team_full(&self) -> bool {
        evaluate_team_status(self.selected_users.len(), self.max_team_size) == TeamStatus::Matched
    }

    pub fn has_applied(&self, user: UserId) -> bool {
        self.applicants.iter().any(|a| a.user == user)
    }

    pub fn apply(&mut self, applicant: MatchApplicant) -> Result<(), PortalError> {
        if applicant.user == self.user {
            return Err(PortalError::Validation(
                "You cannot apply to your own match request".to_string(),
            ));
        }
        if self.has_applied(applicant.user) {
            return Err(PortalError::DuplicateMembership);
        }
        if self.is_team_full() {
            return Err(PortalError::CapacityExceeded);
        }
        self.applicants.push(applicant);
        Ok(())
    }

    /// Move an applicant into the team.
    pub fn select(&mut self, user: UserId) -> Result<(), PortalError> {
        if !self.has_applied(user) {
            return Err(PortalError::Validation(
                "Only applicants can be selected".to_string(),
            ));
        }
        if self.selected_users.contains(&user) {
            return Err(PortalError::DuplicateMembership);
        }
        if self.is_team_full() {
            return Err(PortalError::CapacityExceeded);
        }
        self.selected_users.push(user);
        Ok(())
    }

    pub fn deselect(&mut self, user: UserId) -> Result<(), PortalError> {
        if !self.selected_users.contains(&user) {
            return Err(PortalError::NotAMember);
        }
        self.selected_users.retain(|u| *u != user);
        Ok(())
    }

    pub fn release(&mut self, user: UserId) -> bool {
        let before = self.applicants.len() + self.selected_users.len();
        self.applicants.retain(|a| a.user != user);
        self.selected_users.retain(|u| *u != user);
        self.applicants.len() + self.selected_users.len() != before
    }
}

// =============================================================================
// PROJECT POSTING
// =============================================================================

impl ProjectPosting {
    pub fn is_full(&self) -> bool {
        evaluate_project_status(&self.required_roles, &self.selected_users) == ProjectStatus::Closed
    }

    pub fn has_applied(&self, user: UserId) -> bool {
        self.applicants.iter().any(|a| a.user == user)
    }

    pub fn is_selected(&self, user: UserId) -> bool {
        self.selected_users.iter().any(|m| m.user == user)
    }

    pub fn apply(&mut self, applicant: ProjectApplicant) -> Result<(), PortalError> {
        if applicant.user == self.posted_by {
            return Err(PortalError::Validation(
                "You cannot apply to your own project".to_string(),
            ));
        }
        if self.has_applied(applicant.user) {
            return Err(PortalError::DuplicateMembership);
        }
        if self.is_full() {
            return Err(PortalError::CapacityExceeded);
        }
        self.applicants.push(applicant);
        Ok(())
    }

    /// Move an applicant into the team under one of the required roles.
    pub fn select(&mut self, user: UserId, role: &str) -> Result<(), PortalError> {
        let role = validation::required_text("role", role)?;
        let Some(required) = self.required_roles.iter().find(|r| r.role == role) else {
            return Err(PortalError::Validation(format!(
                "Role '{}' is not required by this project",
                role
            )));
        };
        let needed = required.count as usize;

        if !self.has_applied(user) {
            return Err(PortalError::Validation(
                "Only applicants can be selected".to_string(),
            ));
        }
        if self.is_selected(user) {
            return Err(PortalError::DuplicateMembership);
        }
        let filled = role_counts(&self.selected_users)
            .get(role.as_str())
            .copied()
            .unwrap_or(0);
        if filled >= needed {
            return Err(PortalError::CapacityExceeded);
        }

        self.selected_users.push(SelectedMember { user, role });
        Ok(())
    }

    pub fn deselect(&mut self, user: UserId) -> Result<(), PortalError> {
        if !self.is_selected(user) {
            return Err(PortalError::NotAMember);
        }
        self.selected_users.retain(|m| m.user != user);
        Ok(())
    }

    pub fn release(&mut self, user: UserId) -> bool {
        let before = self.applicants.len() + self.selected_users.len();
        self.applicants.retain(|a| a.user != user);
        self.selected_users.retain(|m| m.user != user);
        self.applicants.len() + self.selected_users.len() != before
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::BeforePersist;
    use crate::model::{NewEvent, NewMatchRequest, NewProject, RequiredRole};
    use crate::types::{CollegeId, EventId, EventTag, EventType};
    use chrono::{Duration, Utc};

    fn event_with_capacity(max: u32) -> Event {
        let now = Utc::now();
        NewEvent {
            title: "Hack Night".to_string(),
            description: "Build things".to_string(),
            tags: vec![EventTag::Hackathon],
            event_type: EventType::Virtual,
            location: None,
            start_date: now + Duration::days(1),
            end_date: now + Duration::days(2),
            college: CollegeId::generate(),
            max_participants: max,
            registration_link: None,
        }
        .into_event(UserId::generate(), now)
        .expect("valid event")
    }

    fn match_request(owner: UserId, size: u32) -> MatchRequest {
        NewMatchRequest {
            event: EventId::generate(),
            max_team_size: size,
            looking_for_roles: Vec::new(),
            skills: Vec::new(),
        }
        .into_match_request(owner, Utc::now())
        .expect("valid request")
    }

    fn project(owner: UserId) -> ProjectPosting {
        NewProject {
            title: "Chatbot".to_string(),
            description: "Needs a team".to_string(),
            required_roles: vec![RequiredRole::new("Frontend", 1), RequiredRole::new("Backend", 1)],
            availability: Vec::new(),
        }
        .into_project(owner, Utc::now())
        .expect("valid project")
    }

    fn apply_match(request: &mut MatchRequest, user: UserId) {
        request
            .apply(MatchApplicant::new(user, None, None, Utc::now()).expect("applicant"))
            .expect("apply");
    }

    fn apply_project(project: &mut ProjectPosting, user: UserId) {
        project
            .apply(ProjectApplicant {
                user,
                message: None,
                applied_at: Utc::now(),
            })
            .expect("apply");
    }

    #[test]
    fn join_scenario_duplicate_then_capacity() {
        let mut event = event_with_capacity(1);
        let u = UserId::generate();
        let v = UserId::generate();

        event.register(u).expect("first join");
        assert_eq!(event.registered_users, vec![u]);
        assert_eq!(event.register(u), Err(PortalError::DuplicateMembership));
        assert_eq!(event.register(v), Err(PortalError::CapacityExceeded));
    }

    #[test]
    fn leave_requires_membership() {
        let mut event = event_with_capacity(2);
        let u = UserId::generate();
        assert_eq!(event.leave(u), Err(PortalError::NotAMember));

        event.register(u).expect("join");
        event.leave(u).expect("leave");
        assert!(event.registered_users.is_empty());
    }

    #[test]
    fn release_frees_seats_and_reopens() {
        let mut event = event_with_capacity(1);
        let (u, v) = (UserId::generate(), UserId::generate());
        event.register(u).expect("join");
        assert!(event.release(u));
        assert!(!event.release(u));
        event.register(v).expect("seat is free again");

        let mut request = match_request(UserId::generate(), 1);
        apply_match(&mut request, u);
        request.select(u).expect("select");
        request.before_persist(Utc::now());
        assert_eq!(request.status, TeamStatus::Matched);
        assert!(request.release(u));
        request.before_persist(Utc::now());
        assert_eq!(request.status, TeamStatus::Pending);
        assert!(request.applicants.is_empty());

        let mut posting = project(UserId::generate());
        apply_project(&mut posting, u);
        posting.select(u, "Frontend").expect("select");
        assert!(posting.release(u));
        assert!(posting.applicants.is_empty() && posting.selected_users.is_empty());
    }

    #[test]
    fn team_fills_and_reopens() {
        let owner = UserId::generate();
        let (a, b) = (UserId::generate(), UserId::generate());
        let mut request = match_request(owner, 2);
        apply_match(&mut request, a);
        apply_match(&mut request, b);

        request.select(a).expect("select a");
        request.before_persist(Utc::now());
        assert_eq!(request.status, TeamStatus::Pending);

        request.select(b).expect("select b");
        request.before_persist(Utc::now());
        assert_eq!(request.status, TeamStatus::Matched);

        request.deselect(b).expect("deselect b");
        request.before_persist(Utc::now());
        assert_eq!(request.status, TeamStatus::Pending);
    }

    #[test]
    fn team_rejects_duplicates_before_capacity() {
        let owner = UserId::generate();
        let (a, c) = (UserId::generate(), UserId::generate());
        let mut request = match_request(owner, 1);
        apply_match(&mut request, a);

        request.select(a).expect("select");
        assert_eq!(request.select(a), Err(PortalError::DuplicateMembership));

        let late = MatchApplicant::new(c, None, None, Utc::now()).expect("applicant");
        assert_eq!(request.apply(late), Err(PortalError::CapacityExceeded));
    }

    #[test]
    fn team_select_requires_application() {
        let mut request = match_request(UserId::generate(), 2);
        assert!(matches!(
            request.select(UserId::generate()),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn owner_cannot_apply_to_own_request() {
        let owner = UserId::generate();
        let mut request = match_request(owner, 2);
        let own = MatchApplicant::new(owner, None, None, Utc::now()).expect("applicant");
        assert!(matches!(request.apply(own), Err(PortalError::Validation(_))));
    }

    #[test]
    fn project_role_selection_rules() {
        let owner = UserId::generate();
        let (a, b, c) = (UserId::generate(), UserId::generate(), UserId::generate());
        let mut posting = project(owner);
        apply_project(&mut posting, a);
        apply_project(&mut posting, b);
        apply_project(&mut posting, c);

        assert!(matches!(
            posting.select(a, "Designer"),
            Err(PortalError::Validation(_))
        ));

        posting.select(a, " Frontend ").expect("frontend");
        assert_eq!(posting.select(a, "Backend"), Err(PortalError::DuplicateMembership));
        assert_eq!(posting.select(b, "Frontend"), Err(PortalError::CapacityExceeded));

        posting.select(b, "Backend").expect("backend");
        posting.before_persist(Utc::now());
        assert_eq!(posting.status, ProjectStatus::Closed);

        let late = ProjectApplicant {
            user: UserId::generate(),
            message: None,
            applied_at: Utc::now(),
        };
        assert_eq!(posting.apply(late), Err(PortalError::CapacityExceeded));

        posting.deselect(a).expect("deselect");
        posting.before_persist(Utc::now());
        assert_eq!(posting.status, ProjectStatus::Open);
        assert_eq!(posting.deselect(a), Err(PortalError::NotAMember));
    }

    #[test]
    fn project_duplicate_application_is_rejected() {
        let mut posting = project(UserId::generate());
        let a = UserId::generate();
        apply_project(&mut posting, a);
        let again = ProjectApplicant {
            user: a,
            message: Some("again".to_string()),
            applied_at: Utc::now(),
        };
        assert_eq!(posting.apply(again), Err(PortalError::DuplicateMembership));
    }
}
