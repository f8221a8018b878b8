//! # Portal Integration Tests
//!
//! End-to-end behavior of the service facade over an on-disk redb store,
//! including concurrent joins against a nearly full event.

#![allow(clippy::panic)]

use chrono::{Duration, TimeZone, Utc};
use portal_core::{
    Actor, EventStatus, EventTag, EventType, FixedClock, NewCollege, NewEvent, NewMatchRequest,
    NewProject, NewUser, Portal, PortalError, ProjectStatus, RequiredRole, StorageBackend,
    TeamStatus,
};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::{TempDir, tempdir};

fn open_portal() -> (TempDir, Portal) {
    let dir = tempdir().expect("tempdir");
    let portal = Portal::open(dir.path().join("portal.redb")).expect("open");
    (dir, portal)
}

fn register(portal: &Portal, name: &str) -> Actor {
    let user = portal
        .register_user(NewUser {
            name: name.to_string(),
            username: name.to_string(),
            email: format!("{}@gla.ac.in", name),
            password_hash: "hash".to_string(),
            ..NewUser::default()
        })
        .expect("register");
    Actor::new(user.id, user.is_admin)
}

fn admin(portal: &Portal) -> Actor {
    let actor = register(portal, "admin");
    let user = portal.set_admin(actor.user_id, true).expect("promote");
    Actor::new(user.id, user.is_admin)
}

fn college(portal: &Portal, admin: Actor) -> portal_core::CollegeId {
    portal
        .create_college(
            admin,
            NewCollege {
                name: "GLA University".to_string(),
                domain: "gla.ac.in".to_string(),
                ..NewCollege::default()
            },
        )
        .expect("college")
        .id
}

fn draft(college: portal_core::CollegeId, max: u32) -> NewEvent {
    let start = Utc::now() + Duration::days(7);
    NewEvent {
        title: "Code Sprint".to_string(),
        description: "Solve problems".to_string(),
        tags: vec![EventTag::Coding],
        event_type: EventType::Hybrid,
        location: Some("Lab 3".to_string()),
        start_date: start,
        end_date: start + Duration::hours(6),
        college,
        max_participants: max,
        registration_link: Some("https://forms.example/sprint".to_string()),
    }
}

#[test]
fn concurrent_joins_never_exceed_capacity() {
    let (_dir, portal) = open_portal();
    let admin = admin(&portal);
    let college = college(&portal, admin);
    let capacity = 3;
    let event = portal
        .create_event(admin, draft(college, capacity))
        .expect("event");

    let joiners: Vec<Actor> = (0..12)
        .map(|i| register(&portal, &format!("joiner{}", i)))
        .collect();

    let portal = Arc::new(portal);
    let barrier = Arc::new(Barrier::new(joiners.len()));
    let handles: Vec<_> = joiners
        .into_iter()
        .map(|actor| {
            let portal = Arc::clone(&portal);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                portal.register_for_event(actor, event.id)
            })
        })
        .collect();

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.join().expect("thread") {
            Ok(_) => accepted += 1,
            Err(PortalError::CapacityExceeded) => rejected += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(accepted, capacity as usize);
    assert_eq!(rejected, 12 - capacity as usize);
    let stored = portal.get_event(event.id).expect("event");
    assert_eq!(stored.registered_users.len(), capacity as usize);
}

#[test]
fn documents_and_indexes_survive_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("portal.redb");

    let (user_id, event_id) = {
        let portal = Portal::open(&path).expect("open");
        let admin = admin(&portal);
        let college = college(&portal, admin);
        let u = register(&portal, "keshav");
        let event = portal.create_event(admin, draft(college, 5)).expect("event");
        portal.register_for_event(u, event.id).expect("join");
        (u.user_id, event.id)
    };

    let portal = Portal::open(&path).expect("reopen");
    let user = portal
        .find_user_by_email("keshav@gla.ac.in")
        .expect("lookup")
        .expect("present");
    assert_eq!(user.id, user_id);
    assert_eq!(user.participated_events, vec![event_id]);
    assert_eq!(portal.get_event(event_id).expect("event").registered_users, vec![user_id]);

    let dup = portal.register_user(NewUser {
        name: "Again".to_string(),
        username: "keshav".to_string(),
        email: "other@gla.ac.in".to_string(),
        password_hash: "hash".to_string(),
        ..NewUser::default()
    });
    assert!(matches!(dup, Err(PortalError::DuplicateKey { field: "username", .. })));
}

#[test]
fn scenarios_over_a_fixed_clock() {
    let day = |d: u32| Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).single().expect("date");
    let clock = Arc::new(FixedClock::new(day(9)));
    let dir = tempdir().expect("tempdir");
    let portal = Portal::with_clock(
        StorageBackend::open(dir.path().join("portal.redb")).expect("open"),
        clock.clone(),
    );
    let admin = admin(&portal);
    let college = college(&portal, admin);

    // Event window
    let mut window = draft(college, 1);
    window.start_date = day(10);
    window.end_date = day(12);
    let event = portal.create_event(admin, window).expect("event");
    assert_eq!(event.event_status, EventStatus::Upcoming);
    clock.set(day(11));
    portal.refresh_event_statuses().expect("refresh");
    assert_eq!(portal.get_event(event.id).expect("event").event_status, EventStatus::Ongoing);
    clock.set(day(13));
    portal.refresh_event_statuses().expect("refresh");
    assert_eq!(portal.get_event(event.id).expect("event").event_status, EventStatus::Past);

    // Join capacity
    let (u, v) = (register(&portal, "umang"), register(&portal, "varun"));
    portal.register_for_event(u, event.id).expect("join");
    assert_eq!(portal.register_for_event(u, event.id), Err(PortalError::DuplicateMembership));
    assert_eq!(portal.register_for_event(v, event.id), Err(PortalError::CapacityExceeded));

    // Team fill
    let request = portal
        .create_match_request(
            u,
            NewMatchRequest {
                event: event.id,
                max_team_size: 2,
                looking_for_roles: Vec::new(),
                skills: Vec::new(),
            },
        )
        .expect("request");
    let (a, b) = (register(&portal, "anika"), register(&portal, "bhavya"));
    portal.apply_to_match(a, request.id, None, None).expect("apply");
    portal.apply_to_match(b, request.id, None, None).expect("apply");
    let one = portal.select_match_member(u, request.id, a.user_id).expect("select");
    assert_eq!(one.status, TeamStatus::Pending);
    let two = portal.select_match_member(u, request.id, b.user_id).expect("select");
    assert_eq!(two.status, TeamStatus::Matched);

    // Role fill
    let project = portal
        .create_project(
            u,
            NewProject {
                title: "Campus App".to_string(),
                description: "Two roles".to_string(),
                required_roles: vec![RequiredRole::new("Frontend", 1), RequiredRole::new("Backend", 1)],
                availability: Vec::new(),
            },
        )
        .expect("project");
    assert_eq!(project.status, ProjectStatus::Open);
    portal.apply_to_project(a, project.id, None).expect("apply");
    portal.apply_to_project(b, project.id, None).expect("apply");
    let half = portal
        .select_project_member(u, project.id, a.user_id, "Frontend")
        .expect("select");
    assert_eq!(half.status, ProjectStatus::Open);
    let full = portal
        .select_project_member(u, project.id, b.user_id, "Backend")
        .expect("select");
    assert_eq!(full.status, ProjectStatus::Closed);
}
