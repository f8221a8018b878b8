//! # Lifecycle Benchmarks
//!
//! Performance benchmarks for the status evaluators and the store write path.
//!
//! Run with: `cargo bench -p portal-core`

use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use portal_core::{
    Actor, EventTag, EventType, NewCollege, NewEvent, NewUser, Portal, RequiredRole,
    SelectedMember, UserId, evaluate_event_status, evaluate_project_status,
};
use std::hint::black_box;

/// Required roles `role0..roleN`, each met by one selected member.
fn filled_roles(size: usize) -> (Vec<RequiredRole>, Vec<SelectedMember>) {
    let roles: Vec<RequiredRole> = (0..size)
        .map(|i| RequiredRole::new(&format!("role{}", i), 1))
        .collect();
    let selected = roles
        .iter()
        .map(|r| SelectedMember::new(UserId::generate(), &r.role))
        .collect();
    (roles, selected)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_event_status(c: &mut Criterion) {
    let start = Utc::now();
    let end = start + Duration::days(2);
    let now = start + Duration::days(1);

    c.bench_function("evaluate_event_status", |b| {
        b.iter(|| black_box(evaluate_event_status(black_box(now), start, end)));
    });
}

fn bench_project_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_project_status");

    for size in [1, 10, 100].iter() {
        let (roles, selected) = filled_roles(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(evaluate_project_status(&roles, &selected)));
        });
    }

    group.finish();
}

fn bench_event_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("register_for_event");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let portal = Portal::in_memory();
                let host = portal
                    .register_user(NewUser {
                        name: "Host".to_string(),
                        username: "host".to_string(),
                        email: "host@bench.edu".to_string(),
                        password_hash: "hash".to_string(),
                        is_admin: true,
                        ..NewUser::default()
                    })
                    .expect("host");
                let host = Actor::new(host.id, true);
                let college = portal
                    .create_college(
                        host,
                        NewCollege {
                            name: "Bench College".to_string(),
                            domain: "bench.edu".to_string(),
                            ..NewCollege::default()
                        },
                    )
                    .expect("college");
                let start = Utc::now() + Duration::days(1);
                let event = portal
                    .create_event(
                        host,
                        NewEvent {
                            title: "Bench".to_string(),
                            description: "Joins".to_string(),
                            tags: vec![EventTag::Coding],
                            event_type: EventType::Virtual,
                            location: None,
                            start_date: start,
                            end_date: start + Duration::hours(1),
                            college: college.id,
                            max_participants: u32::try_from(size).expect("size fits"),
                            registration_link: None,
                        },
                    )
                    .expect("event");
                for _ in 0..size {
                    let _ = portal.register_for_event(Actor::new(UserId::generate(), false), event.id);
                }
                black_box(portal)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_event_status,
    bench_project_status,
    bench_event_join
);
criterion_main!(benches);
