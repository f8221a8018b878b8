//! # One Portal HTTP API Module
//!
//! This module implements the HTTP JSON API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Banner
//! - `GET /health` - Health check
//! - `/api/users` - Register, login, profile, admin user management
//! - `/api/colleges` - College directory
//! - `/api/events` - Events, joining and leaving, per-event match requests
//! - `/api/matches` - Team-matching requests
//! - `/api/projects` - Project postings
//!
//! ## Security Configuration
//!
//! - `PORTAL_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `PORTAL_JWT_SECRET`: HS256 secret for bearer tokens

pub mod auth;
pub mod error;
pub mod handlers;
pub mod json;
pub mod types;

pub use auth::{AdminUser, AuthUser, Claims, TokenService};
pub use error::ApiError;
pub use types::{AuthResponse, HealthResponse, MessageResponse, UserResponse};

use crate::config::PortalConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use handlers::{colleges, events, matches, projects, users};
use portal_core::{Portal, PortalError};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<Portal>,
    pub tokens: Arc<TokenService>,
    /// Raw `cors_origins` setting, see [`build_cors_layer`].
    pub cors_origins: Option<String>,
}

impl AppState {
    #[must_use]
    pub fn new(portal: Portal, tokens: TokenService) -> Self {
        Self {
            portal: Arc::new(portal),
            tokens: Arc::new(tokens),
            cors_origins: None,
        }
    }

    /// State for a resolved configuration.
    #[must_use]
    pub fn from_config(portal: Portal, config: &PortalConfig) -> Self {
        let tokens = TokenService::new(config.jwt_secret_or_default(), config.token_ttl_hours);
        Self {
            cors_origins: config.cors_origins.clone(),
            ..Self::new(portal, tokens)
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the `cors_origins` setting.
///
/// - `"*"`: allows all origins (development only)
/// - unset: localhost frontends only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (PORTAL_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                with_api_methods(CorsLayer::new().allow_origin(allowed_origins))
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// CORS layer that only allows the local development frontends.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
    ];
    let origins: Vec<HeaderValue> = localhost_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    with_api_methods(CorsLayer::new().allow_origin(origins))
}

fn with_api_methods(layer: CorsLayer) -> CorsLayer {
    layer
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register_handler))
        .route("/login", post(users::login_handler))
        .route("/profile", get(users::profile_handler))
        .route("/", get(users::list_users_handler))
        .route(
            "/{id}",
            put(users::update_user_handler).delete(users::delete_user_handler),
        )
}

fn college_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(colleges::list_colleges_handler).post(colleges::create_college_handler),
    )
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(events::list_events_handler).post(events::create_event_handler),
        )
        .route("/my", get(events::my_events_handler))
        .route(
            "/{id}",
            get(events::get_event_handler)
                .put(events::update_event_handler)
                .delete(events::delete_event_handler),
        )
        .route("/{id}/register", post(events::register_event_handler))
        .route("/{id}/leave", post(events::leave_event_handler))
        .route("/{id}/matches", get(events::event_matches_handler))
}

fn match_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(matches::create_match_handler))
        .route(
            "/{id}",
            get(matches::get_match_handler).delete(matches::delete_match_handler),
        )
        .route("/{id}/apply", post(matches::apply_match_handler))
        .route("/{id}/select", post(matches::select_match_handler))
        .route("/{id}/deselect", post(matches::deselect_match_handler))
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects::list_projects_handler).post(projects::create_project_handler),
        )
        .route(
            "/{id}",
            get(projects::get_project_handler)
                .put(projects::update_project_handler)
                .delete(projects::delete_project_handler),
        )
        .route("/{id}/apply", post(projects::apply_project_handler))
        .route("/{id}/select", post(projects::select_project_handler))
        .route("/{id}/deselect", post(projects::deselect_project_handler))
}

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.cors_origins.as_deref());

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .nest("/api/users", user_routes())
        .nest("/api/colleges", college_routes())
        .nest("/api/events", event_routes())
        .nest("/api/matches", match_routes())
        .nest("/api/projects", project_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(2 * 1024 * 1024)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), PortalError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PortalError::Storage(format!("Bind failed: {}", e)))?;

    tracing::info!("One Portal HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PortalError::Storage(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
