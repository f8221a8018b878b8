//! # Portal
//!
//! The service facade over a [`StorageBackend`] and a [`Clock`].
//!
//! Every operation that changes a membership set runs its decision inside
//! [`DocumentStore::update`], so the decision, the status re-evaluation and
//! the write are one atomic step. Authorization gates run inside the same
//! step, against the stored owner.
//!
//! Back-references on users (`participatedEvents`, `hostedEvents`) are kept
//! with a second, separate write. A user that disappeared in between is
//! skipped; any other failure is returned after the primary write has
//! already committed.

use crate::clock::{Clock, SystemClock};
use crate::model::{
    College, Event, EventPatch, MatchApplicant, MatchRequest, NewCollege, NewEvent,
    NewMatchRequest, NewProject, NewUser, ProjectApplicant, ProjectPatch, ProjectPosting, User,
    UserPatch,
};
use crate::search::title_matches;
use crate::storage::{Document, DocumentStore, StorageBackend, not_found};
use crate::types::{
    Actor, CollegeId, EventId, EventStatus, EventTag, MatchRequestId, PortalError, ProjectId,
    ProjectStatus, UserId,
};
use crate::validation;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// FILTERS
// =============================================================================

/// Event listing filter. Every set field must match.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub tag: Option<EventTag>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    pub college: Option<CollegeId>,
    pub status: Option<EventStatus>,
    /// Title words, see [`crate::search`].
    pub query: Option<String>,
}

impl EventFilter {
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if self.tag.is_some_and(|t| !event.tags.contains(&t)) {
            return false;
        }
        let location = event.location.to_lowercase();
        if self
            .location
            .as_deref()
            .is_some_and(|l| !location.contains(&l.trim().to_lowercase()))
        {
            return false;
        }
        if self.college.is_some_and(|c| c != event.college) {
            return false;
        }
        if self.status.is_some_and(|s| s != event.event_status) {
            return false;
        }
        self.query
            .as_deref()
            .is_none_or(|q| title_matches(&event.title, q))
    }
}

/// Project listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub query: Option<String>,
}

impl ProjectFilter {
    #[must_use]
    pub fn matches(&self, project: &ProjectPosting) -> bool {
        if self.status.is_some_and(|s| s != project.status) {
            return false;
        }
        self.query
            .as_deref()
            .is_none_or(|q| title_matches(&project.title, q))
    }
}

// =============================================================================
// PORTAL
// =============================================================================

pub struct Portal {
    store: StorageBackend,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Portal {
    /// A portal on the system clock.
    #[must_use]
    pub fn new(store: StorageBackend) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(store: StorageBackend, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// A portal on a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(StorageBackend::default())
    }

    /// A portal on a redb database at `path`, created if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PortalError> {
        StorageBackend::open(path).map(Self::new)
    }

    #[must_use]
    pub fn store(&self) -> &StorageBackend {
        &self.store
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn fetch<D: Document>(&self, key: u128) -> Result<D, PortalError> {
        self.store.get::<D>(key)?.ok_or_else(|| not_found::<D>(key))
    }

    fn update<D, T>(
        &self,
        key: u128,
        f: impl FnOnce(&mut D) -> Result<T, PortalError>,
    ) -> Result<(D, T), PortalError>
    where
        D: Document,
    {
        self.store.update(key, self.clock.as_ref(), f)
    }

    /// Best-effort write to a user's back-references.
    fn touch_user(&self, user: UserId, f: impl FnOnce(&mut User)) -> Result<(), PortalError> {
        match self.update(user.as_u128(), |u: &mut User| {
            f(u);
            Ok(())
        }) {
            Ok(_) | Err(PortalError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub fn register_user(&self, draft: NewUser) -> Result<User, PortalError> {
        if let Some(college) = draft.college {
            self.get_college(college)?;
        }
        let user = draft.into_user(self.now())?;
        self.store.insert(user, self.now())
    }

    /// Credential lookup. Emails are compared in normalized form.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        let email = email.trim().to_lowercase();
        self.store.find_unique::<User>("email", &email)
    }

    pub fn get_user(&self, id: UserId) -> Result<User, PortalError> {
        self.fetch(id.as_u128())
    }

    /// All users, oldest first.
    pub fn list_users(&self) -> Result<Vec<User>, PortalError> {
        let mut users = self.store.list::<User>()?;
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    /// Update a profile. Only the user themself or an admin may do so, and
    /// only an admin may change `is_admin`.
    pub fn update_user(
        &self,
        actor: Actor,
        id: UserId,
        patch: UserPatch,
    ) -> Result<User, PortalError> {
        if let Some(college) = patch.college {
            self.get_college(college)?;
        }
        let (user, ()) = self.update(id.as_u128(), |user: &mut User| {
            actor.ensure_owner_or_admin(user.id, "update this profile")?;
            if patch.changes_admin(user) && !actor.is_admin {
                return Err(PortalError::Authorization(
                    "Only an admin can change admin rights".to_string(),
                ));
            }
            patch.apply(user)
        })?;
        Ok(user)
    }

    /// Delete a user and release every seat, application and team slot they
    /// hold. Documents the user created stay in place.
    pub fn delete_user(&self, actor: Actor, id: UserId) -> Result<User, PortalError> {
        if !actor.is_admin {
            return Err(PortalError::Authorization(
                "Only an admin can delete users".to_string(),
            ));
        }
        let user = self
            .store
            .delete::<User>(id.as_u128())?
            .ok_or_else(|| not_found::<User>(id.as_u128()))?;
        self.release_everywhere::<Event>(id, Event::release)?;
        self.release_everywhere::<MatchRequest>(id, MatchRequest::release)?;
        self.release_everywhere::<ProjectPosting>(id, ProjectPosting::release)?;
        Ok(user)
    }

    /// Re-save every `D` that still references `user`, with the reference
    /// dropped. The save recomputes derived statuses.
    fn release_everywhere<D: Document>(
        &self,
        user: UserId,
        release: impl Fn(&mut D, UserId) -> bool,
    ) -> Result<(), PortalError> {
        for mut doc in self.store.list::<D>()? {
            if !release(&mut doc, user) {
                continue;
            }
            match self.update(doc.key(), |current: &mut D| {
                release(current, user);
                Ok(())
            }) {
                Ok(_) | Err(PortalError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Grant or revoke admin rights. Operator path, no actor check.
    pub fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User, PortalError> {
        let (user, ()) = self.update(id.as_u128(), |user: &mut User| {
            user.is_admin = is_admin;
            Ok(())
        })?;
        Ok(user)
    }

    // -------------------------------------------------------------------------
    // Colleges
    // -------------------------------------------------------------------------

    pub fn create_college(&self, actor: Actor, draft: NewCollege) -> Result<College, PortalError> {
        if !actor.is_admin {
            return Err(PortalError::Authorization(
                "Only an admin can add colleges".to_string(),
            ));
        }
        let college = draft.into_college(self.now())?;
        self.store.insert(college, self.now())
    }

    /// All colleges, by name.
    pub fn list_colleges(&self) -> Result<Vec<College>, PortalError> {
        let mut colleges = self.store.list::<College>()?;
        colleges.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(colleges)
    }

    pub fn get_college(&self, id: CollegeId) -> Result<College, PortalError> {
        self.fetch(id.as_u128())
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Create an event hosted by `actor` at an existing college.
    pub fn create_event(&self, actor: Actor, draft: NewEvent) -> Result<Event, PortalError> {
        self.get_college(draft.college)?;
        let event = draft.into_event(actor.user_id, self.now())?;
        let event = self.store.insert(event, self.now())?;
        self.touch_user(actor.user_id, |u| u.add_hosted_event(event.id))?;
        Ok(event)
    }

    pub fn get_event(&self, id: EventId) -> Result<Event, PortalError> {
        self.fetch(id.as_u128())
    }

    /// Events matching `filter`, newest first.
    pub fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, PortalError> {
        let mut events: Vec<Event> = self
            .store
            .list::<Event>()?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    /// Events `user` has joined, newest first.
    pub fn my_events(&self, user: UserId) -> Result<Vec<Event>, PortalError> {
        let mut events: Vec<Event> = self
            .store
            .list::<Event>()?
            .into_iter()
            .filter(|e| e.is_registered(user))
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    pub fn update_event(
        &self,
        actor: Actor,
        id: EventId,
        patch: EventPatch,
    ) -> Result<Event, PortalError> {
        if let Some(college) = patch.college {
            self.get_college(college)?;
        }
        let (event, ()) = self.update(id.as_u128(), |event: &mut Event| {
            actor.ensure_owner_or_admin(event.created_by, "update this event")?;
            patch.apply(event)
        })?;
        Ok(event)
    }

    /// Delete an event with its match requests, and drop it from every
    /// member's and the host's profile.
    pub fn delete_event(&self, actor: Actor, id: EventId) -> Result<Event, PortalError> {
        let event: Event = self.get_event(id)?;
        actor.ensure_owner_or_admin(event.created_by, "delete this event")?;

        let Some(event) = self.store.delete::<Event>(id.as_u128())? else {
            return Err(not_found::<Event>(id.as_u128()));
        };
        for request in self.store.list::<MatchRequest>()? {
            if request.event == event.id {
                self.store.delete::<MatchRequest>(request.id.as_u128())?;
            }
        }
        for user in event.registered_users.iter().chain([&event.created_by]) {
            self.touch_user(*user, |u| u.forget_event(event.id))?;
        }
        Ok(event)
    }

    /// Join an event. Rejects members and full events.
    pub fn register_for_event(&self, actor: Actor, id: EventId) -> Result<Event, PortalError> {
        let (event, ()) = self.update(id.as_u128(), |event: &mut Event| {
            event.register(actor.user_id)
        })?;
        self.touch_user(actor.user_id, |u| u.add_participated_event(event.id))?;
        Ok(event)
    }

    pub fn leave_event(&self, actor: Actor, id: EventId) -> Result<Event, PortalError> {
        let (event, ()) = self.update(id.as_u128(), |event: &mut Event| {
            event.leave(actor.user_id)
        })?;
        self.touch_user(actor.user_id, |u| {
            u.participated_events.retain(|e| *e != event.id);
        })?;
        Ok(event)
    }

    /// Re-save every event so its stored status reflects the clock now.
    /// Returns how many statuses changed.
    pub fn refresh_event_statuses(&self) -> Result<usize, PortalError> {
        let mut changed = 0;
        for event in self.store.list::<Event>()? {
            let (saved, ()) = match self.update(event.id.as_u128(), |_: &mut Event| Ok(())) {
                Ok(saved) => saved,
                Err(PortalError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            if saved.event_status != event.event_status {
                changed += 1;
            }
        }
        Ok(changed)
    }

    // -------------------------------------------------------------------------
    // Match requests
    // -------------------------------------------------------------------------

    pub fn create_match_request(
        &self,
        actor: Actor,
        draft: NewMatchRequest,
    ) -> Result<MatchRequest, PortalError> {
        self.get_event(draft.event)?;
        let request = draft.into_match_request(actor.user_id, self.now())?;
        self.store.insert(request, self.now())
    }

    pub fn get_match_request(&self, id: MatchRequestId) -> Result<MatchRequest, PortalError> {
        self.fetch(id.as_u128())
    }

    /// Match requests for one event, newest first.
    pub fn list_match_requests_for_event(
        &self,
        event: EventId,
    ) -> Result<Vec<MatchRequest>, PortalError> {
        self.get_event(event)?;
        let mut requests: Vec<MatchRequest> = self
            .store
            .list::<MatchRequest>()?
            .into_iter()
            .filter(|r| r.event == event)
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    pub fn apply_to_match(
        &self,
        actor: Actor,
        id: MatchRequestId,
        role: Option<&str>,
        description: Option<&str>,
    ) -> Result<MatchRequest, PortalError> {
        let applicant = MatchApplicant::new(actor.user_id, role, description, self.now())?;
        let (request, ()) = self.update(id.as_u128(), |request: &mut MatchRequest| {
            request.apply(applicant)
        })?;
        Ok(request)
    }

    pub fn select_match_member(
        &self,
        actor: Actor,
        id: MatchRequestId,
        user: UserId,
    ) -> Result<MatchRequest, PortalError> {
        let (request, ()) = self.update(id.as_u128(), |request: &mut MatchRequest| {
            actor.ensure_owner(request.user, "select team members")?;
            request.select(user)
        })?;
        Ok(request)
    }

    pub fn deselect_match_member(
        &self,
        actor: Actor,
        id: MatchRequestId,
        user: UserId,
    ) -> Result<MatchRequest, PortalError> {
        let (request, ()) = self.update(id.as_u128(), |request: &mut MatchRequest| {
            actor.ensure_owner(request.user, "deselect team members")?;
            request.deselect(user)
        })?;
        Ok(request)
    }

    pub fn delete_match_request(
        &self,
        actor: Actor,
        id: MatchRequestId,
    ) -> Result<MatchRequest, PortalError> {
        let request = self.get_match_request(id)?;
        actor.ensure_owner_or_admin(request.user, "delete this match request")?;
        self.store
            .delete::<MatchRequest>(id.as_u128())?
            .ok_or_else(|| not_found::<MatchRequest>(id.as_u128()))
    }

    // -------------------------------------------------------------------------
    // Projects
    // -------------------------------------------------------------------------

    pub fn create_project(
        &self,
        actor: Actor,
        draft: NewProject,
    ) -> Result<ProjectPosting, PortalError> {
        let project = draft.into_project(actor.user_id, self.now())?;
        self.store.insert(project, self.now())
    }

    pub fn get_project(&self, id: ProjectId) -> Result<ProjectPosting, PortalError> {
        self.fetch(id.as_u128())
    }

    /// Projects matching `filter`, newest first.
    pub fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectPosting>, PortalError> {
        let mut projects: Vec<ProjectPosting> = self
            .store
            .list::<ProjectPosting>()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Update the posting; the status is re-evaluated against the new roles.
    pub fn update_project(
        &self,
        actor: Actor,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<ProjectPosting, PortalError> {
        let (project, ()) = self.update(id.as_u128(), |project: &mut ProjectPosting| {
            actor.ensure_owner_or_admin(project.posted_by, "update this project")?;
            patch.apply(project)
        })?;
        Ok(project)
    }

    pub fn delete_project(&self, actor: Actor, id: ProjectId) -> Result<ProjectPosting, PortalError> {
        let project = self.get_project(id)?;
        actor.ensure_owner_or_admin(project.posted_by, "delete this project")?;
        self.store
            .delete::<ProjectPosting>(id.as_u128())?
            .ok_or_else(|| not_found::<ProjectPosting>(id.as_u128()))
    }

    pub fn apply_to_project(
        &self,
        actor: Actor,
        id: ProjectId,
        message: Option<&str>,
    ) -> Result<ProjectPosting, PortalError> {
        let applicant = ProjectApplicant {
            user: actor.user_id,
            message: validation::optional_long_text("message", message)?,
            applied_at: self.now(),
        };
        let (project, ()) = self.update(id.as_u128(), |project: &mut ProjectPosting| {
            project.apply(applicant)
        })?;
        Ok(project)
    }

    pub fn select_project_member(
        &self,
        actor: Actor,
        id: ProjectId,
        user: UserId,
        role: &str,
    ) -> Result<ProjectPosting, PortalError> {
        let (project, ()) = self.update(id.as_u128(), |project: &mut ProjectPosting| {
            actor.ensure_owner(project.posted_by, "select team members")?;
            project.select(user, role)
        })?;
        Ok(project)
    }

    pub fn deselect_project_member(
        &self,
        actor: Actor,
        id: ProjectId,
        user: UserId,
    ) -> Result<ProjectPosting, PortalError> {
        let (project, ()) = self.update(id.as_u128(), |project: &mut ProjectPosting| {
            actor.ensure_owner(project.posted_by, "deselect team members")?;
            project.deselect(user)
        })?;
        Ok(project)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::RequiredRole;
    use crate::types::{EventType, TeamStatus};
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).single().expect("valid date")
    }

    struct Fixture {
        portal: Portal,
        clock: Arc<FixedClock>,
        admin: Actor,
        college: CollegeId,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::new(day(1)));
        let portal = Portal::with_clock(StorageBackend::default(), clock.clone());
        let admin = register(&portal, "admin");
        let admin = Actor::new(portal.set_admin(admin.user_id, true).expect("promote").id, true);
        let college = portal
            .create_college(
                admin,
                NewCollege {
                    name: "IIT Bombay".to_string(),
                    domain: "iitb.ac.in".to_string(),
                    ..NewCollege::default()
                },
            )
            .expect("college")
            .id;
        Fixture {
            portal,
            clock,
            admin,
            college,
        }
    }

    fn register(portal: &Portal, name: &str) -> Actor {
        let user = portal
            .register_user(NewUser {
                name: name.to_string(),
                username: name.to_string(),
                email: format!("{}@iitb.ac.in", name),
                password_hash: "hash".to_string(),
                ..NewUser::default()
            })
            .expect("register");
        Actor::new(user.id, false)
    }

    fn event_draft(college: CollegeId, max: u32) -> NewEvent {
        NewEvent {
            title: "Winter Hackathon".to_string(),
            description: "48 hours".to_string(),
            tags: vec![EventTag::Hackathon],
            event_type: EventType::Virtual,
            location: None,
            start_date: day(10),
            end_date: day(12),
            college,
            max_participants: max,
            registration_link: None,
        }
    }

    #[test]
    fn event_status_follows_clock_on_each_save() {
        let f = fixture();
        let host = register(&f.portal, "host");
        let event = f
            .portal
            .create_event(host, event_draft(f.college, 10))
            .expect("create");
        assert_eq!(event.event_status, EventStatus::Upcoming);

        f.clock.set(day(11));
        assert_eq!(f.portal.refresh_event_statuses().expect("refresh"), 1);
        assert_eq!(
            f.portal.get_event(event.id).expect("get").event_status,
            EventStatus::Ongoing
        );

        f.clock.set(day(13));
        let joiner = register(&f.portal, "joiner");
        let saved = f.portal.register_for_event(joiner, event.id).expect("join");
        assert_eq!(saved.event_status, EventStatus::Past);
        assert_eq!(f.portal.refresh_event_statuses().expect("refresh"), 0);
    }

    #[test]
    fn joining_updates_both_sides() {
        let f = fixture();
        let host = register(&f.portal, "host");
        let u = register(&f.portal, "uma");
        let event = f.portal.create_event(host, event_draft(f.college, 1)).expect("create");

        f.portal.register_for_event(u, event.id).expect("join");
        assert_eq!(f.portal.get_user(u.user_id).expect("user").participated_events, vec![event.id]);
        assert_eq!(f.portal.get_user(host.user_id).expect("user").hosted_events, vec![event.id]);
        assert_eq!(f.portal.my_events(u.user_id).expect("mine").len(), 1);

        f.portal.leave_event(u, event.id).expect("leave");
        assert!(f.portal.get_user(u.user_id).expect("user").participated_events.is_empty());
        assert_eq!(f.portal.leave_event(u, event.id), Err(PortalError::NotAMember));
    }

    #[test]
    fn delete_event_requires_owner_and_cleans_profiles() {
        let f = fixture();
        let host = register(&f.portal, "host");
        let u = register(&f.portal, "uma");
        let event = f.portal.create_event(host, event_draft(f.college, 5)).expect("create");
        f.portal.register_for_event(u, event.id).expect("join");

        assert!(matches!(
            f.portal.delete_event(u, event.id),
            Err(PortalError::Authorization(_))
        ));
        f.portal.delete_event(f.admin, event.id).expect("admin delete");

        assert!(f.portal.get_user(u.user_id).expect("user").participated_events.is_empty());
        assert!(f.portal.get_user(host.user_id).expect("user").hosted_events.is_empty());
        assert!(matches!(
            f.portal.get_event(event.id),
            Err(PortalError::NotFound { kind: "Event", .. })
        ));
    }

    #[test]
    fn deleting_an_event_removes_its_match_requests() {
        let f = fixture();
        let host = register(&f.portal, "host");
        let event = f.portal.create_event(host, event_draft(f.college, 5)).expect("create");
        let other = f.portal.create_event(host, event_draft(f.college, 5)).expect("create");
        let draft = |event: EventId| NewMatchRequest {
            event,
            max_team_size: 2,
            looking_for_roles: Vec::new(),
            skills: Vec::new(),
        };
        let doomed = f.portal.create_match_request(host, draft(event.id)).expect("request");
        let kept = f.portal.create_match_request(host, draft(other.id)).expect("request");

        f.portal.delete_event(host, event.id).expect("delete");

        assert!(matches!(
            f.portal.get_match_request(doomed.id),
            Err(PortalError::NotFound { .. })
        ));
        assert_eq!(f.portal.get_match_request(kept.id).expect("kept").id, kept.id);
    }

    #[test]
    fn deleting_a_user_frees_their_seats() {
        let f = fixture();
        let host = register(&f.portal, "host");
        let (u, v) = (register(&f.portal, "uma"), register(&f.portal, "vik"));
        let event = f.portal.create_event(host, event_draft(f.college, 1)).expect("create");
        f.portal.register_for_event(u, event.id).expect("join");

        let request = f
            .portal
            .create_match_request(
                host,
                NewMatchRequest {
                    event: event.id,
                    max_team_size: 1,
                    looking_for_roles: Vec::new(),
                    skills: Vec::new(),
                },
            )
            .expect("request");
        f.portal.apply_to_match(u, request.id, None, None).expect("apply");
        let request = f.portal.select_match_member(host, request.id, u.user_id).expect("select");
        assert_eq!(request.status, TeamStatus::Matched);

        let project = f
            .portal
            .create_project(
                host,
                NewProject {
                    title: "Notes App".to_string(),
                    description: "Shared notes".to_string(),
                    required_roles: vec![RequiredRole::new("Frontend", 1)],
                    availability: Vec::new(),
                },
            )
            .expect("project");
        f.portal.apply_to_project(u, project.id, None).expect("apply");
        let project = f
            .portal
            .select_project_member(host, project.id, u.user_id, "Frontend")
            .expect("select");
        assert_eq!(project.status, ProjectStatus::Closed);

        f.portal.delete_user(f.admin, u.user_id).expect("delete");

        let event = f.portal.register_for_event(v, event.id).expect("seat was freed");
        assert_eq!(event.registered_users, vec![v.user_id]);

        let request = f.portal.get_match_request(request.id).expect("request");
        assert_eq!(request.status, TeamStatus::Pending);
        assert!(request.applicants.is_empty() && request.selected_users.is_empty());

        let project = f.portal.get_project(project.id).expect("project");
        assert_eq!(project.status, ProjectStatus::Open);
        assert!(project.applicants.is_empty());
    }

    #[test]
    fn event_filters_combine() {
        let f = fixture();
        let host = register(&f.portal, "host");
        f.portal.create_event(host, event_draft(f.college, 5)).expect("create");
        f.clock.set(day(1) + Duration::seconds(1));
        let mut workshop = event_draft(f.college, 5);
        workshop.title = "Rust Workshop".to_string();
        workshop.tags = vec![EventTag::Workshop, EventTag::Coding];
        workshop.event_type = EventType::InPerson;
        workshop.location = Some("Main Auditorium".to_string());
        let workshop = f.portal.create_event(host, workshop).expect("create");

        let all = f.portal.list_events(&EventFilter::default()).expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, workshop.id, "newest first");

        let by_tag = EventFilter {
            tag: Some(EventTag::Coding),
            ..EventFilter::default()
        };
        assert_eq!(f.portal.list_events(&by_tag).expect("list").len(), 1);

        let by_location_and_query = EventFilter {
            location: Some("auditorium".to_string()),
            query: Some("hackathon".to_string()),
            ..EventFilter::default()
        };
        assert!(f.portal.list_events(&by_location_and_query).expect("list").is_empty());
    }

    #[test]
    fn match_request_flow() {
        let f = fixture();
        let host = register(&f.portal, "host");
        let (owner, a, b) = (
            register(&f.portal, "owner"),
            register(&f.portal, "alice"),
            register(&f.portal, "bobby"),
        );
        let event = f.portal.create_event(host, event_draft(f.college, 50)).expect("event");
        let request = f
            .portal
            .create_match_request(
                owner,
                NewMatchRequest {
                    event: event.id,
                    max_team_size: 2,
                    looking_for_roles: vec!["Designer".to_string()],
                    skills: Vec::new(),
                },
            )
            .expect("create");

        f.portal.apply_to_match(a, request.id, Some("Designer"), None).expect("apply");
        f.portal.apply_to_match(b, request.id, None, None).expect("apply");
        assert_eq!(
            f.portal.apply_to_match(a, request.id, None, None),
            Err(PortalError::DuplicateMembership)
        );

        assert!(matches!(
            f.portal.select_match_member(a, request.id, b.user_id),
            Err(PortalError::Authorization(_))
        ));
        f.portal.select_match_member(owner, request.id, a.user_id).expect("select");
        let full = f.portal.select_match_member(owner, request.id, b.user_id).expect("select");
        assert_eq!(full.status, TeamStatus::Matched);

        let reopened = f
            .portal
            .deselect_match_member(owner, request.id, b.user_id)
            .expect("deselect");
        assert_eq!(reopened.status, TeamStatus::Pending);

        assert_eq!(
            f.portal
                .list_match_requests_for_event(event.id)
                .expect("list")
                .len(),
            1
        );
    }

    #[test]
    fn match_request_needs_an_event() {
        let f = fixture();
        let owner = register(&f.portal, "owner");
        let result = f.portal.create_match_request(
            owner,
            NewMatchRequest {
                event: EventId::generate(),
                max_team_size: 2,
                looking_for_roles: Vec::new(),
                skills: Vec::new(),
            },
        );
        assert!(matches!(result, Err(PortalError::NotFound { kind: "Event", .. })));
    }

    #[test]
    fn project_flow_and_patch_reevaluates_status() {
        let f = fixture();
        let (owner, a) = (register(&f.portal, "owner"), register(&f.portal, "alice"));
        let project = f
            .portal
            .create_project(
                owner,
                NewProject {
                    title: "AI Chatbot".to_string(),
                    description: "Team wanted".to_string(),
                    required_roles: vec![RequiredRole::new("Frontend", 1)],
                    availability: Vec::new(),
                },
            )
            .expect("create");

        f.portal.apply_to_project(a, project.id, Some("hi")).expect("apply");
        let closed = f
            .portal
            .select_project_member(owner, project.id, a.user_id, "Frontend")
            .expect("select");
        assert_eq!(closed.status, ProjectStatus::Closed);

        let reopened = f
            .portal
            .update_project(
                owner,
                project.id,
                ProjectPatch {
                    required_roles: Some(vec![
                        RequiredRole::new("Frontend", 1),
                        RequiredRole::new("Backend", 1),
                    ]),
                    ..ProjectPatch::default()
                },
            )
            .expect("update");
        assert_eq!(reopened.status, ProjectStatus::Open);

        let open_only = ProjectFilter {
            status: Some(ProjectStatus::Open),
            query: Some("chatbot".to_string()),
        };
        assert_eq!(f.portal.list_projects(&open_only).expect("list").len(), 1);

        assert!(matches!(
            f.portal.delete_project(a, project.id),
            Err(PortalError::Authorization(_))
        ));
        f.portal.delete_project(owner, project.id).expect("delete");
    }

    #[test]
    fn users_are_unique_and_admin_is_guarded() {
        let f = fixture();
        let u = register(&f.portal, "uma");

        let dup = f.portal.register_user(NewUser {
            name: "Other".to_string(),
            username: "other".to_string(),
            email: " UMA@iitb.ac.in ".to_string(),
            password_hash: "hash".to_string(),
            ..NewUser::default()
        });
        assert_eq!(
            dup.map(|u| u.id).map_err(|e| e.to_string()),
            Err("Email already registered".to_string())
        );

        let escalate = UserPatch {
            is_admin: Some(true),
            ..UserPatch::default()
        };
        assert!(matches!(
            f.portal.update_user(u, u.user_id, escalate.clone()),
            Err(PortalError::Authorization(_))
        ));
        assert!(f.portal.update_user(f.admin, u.user_id, escalate).expect("admin").is_admin);

        let v = register(&f.portal, "vera");
        let echoed = UserPatch {
            name: Some("Vera K".to_string()),
            is_admin: Some(false),
            ..UserPatch::default()
        };
        let saved = f.portal.update_user(v, v.user_id, echoed).expect("own profile echo");
        assert_eq!(saved.name, "Vera K");
        assert!(!saved.is_admin);

        let found = f.portal.find_user_by_email("Uma@IITB.ac.in").expect("lookup");
        assert_eq!(found.map(|u| u.id), Some(u.user_id));

        assert!(f.portal.delete_user(u, f.admin.user_id).is_err());
        f.portal.delete_user(f.admin, u.user_id).expect("delete");
        assert_eq!(f.portal.list_users().expect("list").len(), 2);
    }

    #[test]
    fn colleges_are_admin_only_and_unique() {
        let f = fixture();
        let u = register(&f.portal, "uma");
        let draft = NewCollege {
            name: "IIT Bombay".to_string(),
            domain: "iitb.ac.in".to_string(),
            ..NewCollege::default()
        };
        assert!(matches!(
            f.portal.create_college(u, draft.clone()),
            Err(PortalError::Authorization(_))
        ));
        assert!(matches!(
            f.portal.create_college(f.admin, draft),
            Err(PortalError::DuplicateKey { field: "domain", .. })
        ));
        assert_eq!(f.portal.list_colleges().expect("list").len(), 1);
    }
}
