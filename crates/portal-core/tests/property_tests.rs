//! # Property-Based Tests
//!
//! Invariants of the lifecycle evaluators and membership decisions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use portal_core::{
    BeforePersist, CollegeId, Event, EventStatus, EventTag, EventType, NewEvent, PortalError,
    ProjectStatus, RequiredRole, SelectedMember, TeamStatus, UserId, evaluate_event_status,
    evaluate_project_status, evaluate_team_status,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid date")
}

fn event(max: u32) -> Event {
    NewEvent {
        title: "Prop Event".to_string(),
        description: "Generated".to_string(),
        tags: vec![EventTag::Coding],
        event_type: EventType::Virtual,
        location: None,
        start_date: base(),
        end_date: base() + Duration::days(1),
        college: CollegeId::generate(),
        max_participants: max,
        registration_link: None,
    }
    .into_event(UserId::generate(), base())
    .expect("valid event")
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// An event is Ongoing exactly when the instant lies inside its window.
    #[test]
    fn event_ongoing_iff_inside_window(
        start in -100_000i64..100_000,
        length in 0i64..100_000,
        at in -300_000i64..300_000
    ) {
        let s = base() + Duration::seconds(start);
        let e = s + Duration::seconds(length);
        let t = base() + Duration::seconds(at);

        let status = evaluate_event_status(t, s, e);
        prop_assert_eq!(status == EventStatus::Ongoing, s <= t && t <= e);
        prop_assert_eq!(status == EventStatus::Upcoming, t < s);
        prop_assert_eq!(status == EventStatus::Past, t > e);
    }

    /// Team status is Matched iff the headcount reached the size, and never
    /// goes back to Pending as the headcount grows.
    #[test]
    fn team_status_is_monotonic(size in 1u32..50, count in 0usize..60) {
        let status = evaluate_team_status(count, size);
        prop_assert_eq!(status == TeamStatus::Matched, count >= size as usize);
        if status == TeamStatus::Matched {
            prop_assert_eq!(evaluate_team_status(count + 1, size), TeamStatus::Matched);
        }
    }

    /// A project is Closed iff every required role has enough holders, and
    /// dropping one holder of a just-met role reopens it.
    #[test]
    fn project_closed_iff_every_role_met(
        counts in vec(1u32..4, 1..5),
        filled in vec(0usize..5, 5)
    ) {
        let roles: Vec<RequiredRole> = counts
            .iter()
            .enumerate()
            .map(|(i, &c)| RequiredRole::new(&format!("role{}", i), c))
            .collect();
        let mut selected = Vec::new();
        for (i, role) in roles.iter().enumerate() {
            for _ in 0..filled[i] {
                selected.push(SelectedMember::new(UserId::generate(), &role.role));
            }
        }

        let every_met = roles
            .iter()
            .enumerate()
            .all(|(i, r)| filled[i] >= r.count as usize);
        let status = evaluate_project_status(&roles, &selected);
        prop_assert_eq!(status == ProjectStatus::Closed, every_met);

        if let Some((i, role)) = roles
            .iter()
            .enumerate()
            .find(|(i, r)| filled[*i] == r.count as usize)
        {
            let victim = selected
                .iter()
                .position(|m| m.role == role.role)
                .expect("holder present");
            selected.remove(victim);
            prop_assert_eq!(evaluate_project_status(&roles, &selected), ProjectStatus::Open);
            prop_assert!(filled[i] > 0);
        }
    }

    /// Re-running the before-persist stage at the same instant changes nothing.
    #[test]
    fn before_persist_is_idempotent(at in -200_000i64..200_000) {
        let now = base() + Duration::seconds(at);
        let mut once = event(3);
        once.before_persist(now);
        let mut twice = once.clone();
        twice.before_persist(now);
        prop_assert_eq!(once, twice);
    }

    /// No sequence of joins and leaves pushes an event past its capacity, and
    /// nobody is ever registered twice.
    #[test]
    fn membership_never_exceeds_capacity(
        max in 1u32..8,
        ops in vec((0usize..10, any::<bool>()), 0..80)
    ) {
        let users: Vec<UserId> = (0..10).map(|_| UserId::generate()).collect();
        let mut event = event(max);

        for (who, join) in ops {
            let user = users[who];
            let before = event.registered_users.len();
            let result = if join { event.register(user) } else { event.leave(user) };
            match result {
                Ok(()) => {}
                Err(PortalError::DuplicateMembership)
                | Err(PortalError::CapacityExceeded)
                | Err(PortalError::NotAMember) => {
                    prop_assert_eq!(event.registered_users.len(), before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
            prop_assert!(event.registered_users.len() <= max as usize);

            let mut unique = event.registered_users.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), event.registered_users.len());
        }
    }
}
