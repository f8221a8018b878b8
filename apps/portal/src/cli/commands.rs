//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState, auth::hash_password};
use crate::config::PortalConfig;
use chrono::Duration;
use portal_core::{
    Actor, AvailabilitySlot, College, DocumentStore, Event, EventTag, EventType, MatchRequest,
    NewCollege, NewEvent, NewMatchRequest, NewProject, NewUser, Portal, PortalError,
    ProjectPosting, RequiredRole, User, Weekday,
};
use std::path::Path;

/// Account created by `seed`.
pub const SEED_EMAIL: &str = "demo@gla.ac.in";
pub const SEED_PASSWORD: &str = "portal-demo";

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &PortalConfig) -> Result<(), PortalError> {
    let portal = Portal::open(&config.database)?;
    let state = AppState::from_config(portal, config);

    println!("One Portal Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.host);
    println!("  Port:     {}", config.port);
    println!("  Database: {:?}", config.database);
    println!("  Tokens:   {}h", config.token_ttl_hours);
    println!();
    println!("Endpoints:");
    println!("  /api/users    - Accounts and profiles");
    println!("  /api/colleges - College directory");
    println!("  /api/events   - Events and registrations");
    println!("  /api/matches  - Team matching");
    println!("  /api/projects - Project postings");
    println!("  GET /health   - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.bind_addr(), state).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty database with every collection table.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), PortalError> {
    if db_path.exists() {
        if !force {
            return Err(PortalError::Validation(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| PortalError::Storage(format!("Remove {:?}: {}", db_path, e)))?;
    }

    Portal::open(db_path)?;
    println!("Initialized new database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show document counts.
pub fn cmd_status(db_path: &Path, json_mode: bool) -> Result<(), PortalError> {
    let portal = Portal::open(db_path)?;
    let store = portal.store();

    let users = store.count::<User>()?;
    let colleges = store.count::<College>()?;
    let events = store.count::<Event>()?;
    let matches = store.count::<MatchRequest>()?;
    let projects = store.count::<ProjectPosting>()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": db_path.to_string_lossy(),
            "users": users,
            "colleges": colleges,
            "events": events,
            "match_requests": matches,
            "projects": projects
        }));
        return Ok(());
    }

    println!("One Portal Status");
    println!("=================");
    println!("Database: {:?}", db_path);
    println!();
    println!("Users:          {}", users);
    println!("Colleges:       {}", colleges);
    println!("Events:         {}", events);
    println!("Match requests: {}", matches);
    println!("Projects:       {}", projects);

    Ok(())
}

// =============================================================================
// SEED COMMAND
// =============================================================================

/// Insert one document of each kind, owned by an admin demo account.
pub fn cmd_seed(db_path: &Path, json_mode: bool) -> Result<(), PortalError> {
    let portal = Portal::open(db_path)?;
    if portal.find_user_by_email(SEED_EMAIL)?.is_some() {
        return Err(PortalError::Validation(
            "Database already contains the demo data".to_string(),
        ));
    }

    let user = portal.register_user(NewUser {
        name: "Demo Organizer".to_string(),
        username: "demo".to_string(),
        email: SEED_EMAIL.to_string(),
        password_hash: hash_password(SEED_PASSWORD)?,
        skills: vec!["Rust".to_string(), "Design".to_string()],
        ..NewUser::default()
    })?;
    let user = portal.set_admin(user.id, true)?;
    let actor = Actor::new(user.id, user.is_admin);

    let college = portal.create_college(
        actor,
        NewCollege {
            name: "GLA University".to_string(),
            domain: "gla.ac.in".to_string(),
            location: Some("Mathura".to_string()),
            verified: true,
        },
    )?;

    let start = portal.now() + Duration::days(7);
    let event = portal.create_event(
        actor,
        NewEvent {
            title: "Campus Hack Night".to_string(),
            description: "Twelve hours of building with friends.".to_string(),
            tags: vec![EventTag::Hackathon, EventTag::Coding],
            event_type: EventType::InPerson,
            location: Some("Main Auditorium".to_string()),
            start_date: start,
            end_date: start + Duration::hours(12),
            college: college.id,
            max_participants: 100,
            registration_link: None,
        },
    )?;

    let request = portal.create_match_request(
        actor,
        NewMatchRequest {
            event: event.id,
            max_team_size: 3,
            looking_for_roles: vec!["Frontend".to_string(), "ML".to_string()],
            skills: vec!["React".to_string(), "Python".to_string()],
        },
    )?;

    let project = portal.create_project(
        actor,
        NewProject {
            title: "Lost and Found Board".to_string(),
            description: "A campus board for lost items.".to_string(),
            required_roles: vec![RequiredRole::new("Frontend", 1), RequiredRole::new("Backend", 1)],
            availability: vec![AvailabilitySlot {
                day: Weekday::Saturday,
                time: "10:00-13:00".to_string(),
            }],
        },
    )?;

    if json_mode {
        print_json(&serde_json::json!({
            "user": user.id.to_string(),
            "email": SEED_EMAIL,
            "college": college.id.to_string(),
            "event": event.id.to_string(),
            "match_request": request.id.to_string(),
            "project": project.id.to_string()
        }));
        return Ok(());
    }

    println!("Seeded demo data into {:?}", db_path);
    println!("  Login:         {} / {}", SEED_EMAIL, SEED_PASSWORD);
    println!("  College:       {}", college.id);
    println!("  Event:         {}", event.id);
    println!("  Match request: {}", request.id);
    println!("  Project:       {}", project.id);
    Ok(())
}

// =============================================================================
// PROMOTE COMMAND
// =============================================================================

/// Grant or revoke admin rights by email.
pub fn cmd_promote(
    db_path: &Path,
    email: &str,
    is_admin: bool,
    json_mode: bool,
) -> Result<(), PortalError> {
    let portal = Portal::open(db_path)?;
    let Some(user) = portal.find_user_by_email(email)? else {
        return Err(PortalError::NotFound {
            kind: "User",
            id: email.to_string(),
        });
    };
    let user = portal.set_admin(user.id, is_admin)?;

    if json_mode {
        print_json(&serde_json::json!({
            "user": user.id.to_string(),
            "email": user.email,
            "is_admin": user.is_admin
        }));
        return Ok(());
    }

    if user.is_admin {
        println!("{} is now an admin", user.email);
    } else {
        println!("{} is no longer an admin", user.email);
    }
    Ok(())
}

// =============================================================================
// REFRESH COMMAND
// =============================================================================

/// Re-save every event through the before-persist stage.
pub fn cmd_refresh(db_path: &Path, json_mode: bool) -> Result<(), PortalError> {
    let portal = Portal::open(db_path)?;
    let changed = portal.refresh_event_statuses()?;

    if json_mode {
        print_json(&serde_json::json!({ "changed": changed }));
        return Ok(());
    }

    println!("Refreshed event statuses: {} changed", changed);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("portal.redb");

        cmd_init(&path, false).expect("first init");
        assert!(path.exists());
        assert!(matches!(cmd_init(&path, false), Err(PortalError::Validation(_))));
        cmd_init(&path, true).expect("forced init");
    }

    #[test]
    fn seed_then_promote_and_refresh() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("portal.redb");

        cmd_seed(&path, true).expect("seed");
        assert!(matches!(cmd_seed(&path, true), Err(PortalError::Validation(_))));

        cmd_promote(&path, SEED_EMAIL, false, true).expect("demote");
        cmd_refresh(&path, true).expect("refresh");
        cmd_status(&path, true).expect("status");

        let portal = Portal::open(&path).expect("open");
        let user = portal
            .find_user_by_email(SEED_EMAIL)
            .expect("lookup")
            .expect("present");
        assert!(!user.is_admin);
        assert_eq!(user.hosted_events.len(), 1);
        assert_eq!(portal.store().count::<ProjectPosting>().expect("count"), 1);
    }

    #[test]
    fn promote_unknown_email_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("portal.redb");
        let result = cmd_promote(&path, "ghost@gla.ac.in", true, true);
        assert!(matches!(result, Err(PortalError::NotFound { .. })));
    }
}
