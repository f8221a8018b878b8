//! # One Portal - Campus Events Server
//!
//! The main binary for One Portal.
//!
//! This application provides:
//! - HTTP JSON API server (axum-based)
//! - CLI interface for database maintenance
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   apps/portal (THE BINARY)                  │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌───────────────┐   │
//! │  │   CLI       │    │   HTTP API  │    │  Credentials  │   │
//! │  │  (clap)     │    │   (axum)    │    │ (argon2, JWT) │   │
//! │  └──────┬──────┘    └──────┬──────┘    └───────┬───────┘   │
//! │         │                  │                   │           │
//! │         └──────────────────┼───────────────────┘           │
//! │                            ▼                               │
//! │                    ┌───────────────┐                       │
//! │                    │  portal-core  │                       │
//! │                    │  (THE RULES)  │                       │
//! │                    └───────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! portal server --host 0.0.0.0 --port 5000
//!
//! # Maintenance
//! portal init
//! portal promote --email admin@gla.ac.in
//! portal refresh
//! ```

use clap::Parser;
use portal::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // PORTAL_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("PORTAL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   ___                ___          _        _
  / _ \ _ __   ___   | _ \___  _ _| |_ __ _| |
 | (_) | '  \ / -_)  |  _/ _ \| '_|  _/ _` | |
  \___/|_||_|\___|   |_| \___/|_|  \__\__,_|_|

  Campus Events Server v{}

  Events • Teams • Projects
"#,
        env!("CARGO_PKG_VERSION")
    );
}
