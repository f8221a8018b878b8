//! # One Portal CLI Module
//!
//! This module implements the CLI interface for One Portal.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `status` - Show document counts
//! - `seed` - Insert sample data
//! - `promote` - Grant or revoke admin rights
//! - `refresh` - Re-evaluate every stored event status

mod commands;

use crate::config::PortalConfig;
use clap::{Parser, Subcommand};
use portal_core::PortalError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// One Portal - campus events, team matching and project postings.
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the redb database (overrides config and PORTAL_DATABASE)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show document counts
    Status,

    /// Insert a sample college, user, event, match request and project
    Seed,

    /// Grant admin rights to a user
    Promote {
        /// Email of the account
        #[arg(short, long)]
        email: String,

        /// Revoke admin rights instead
        #[arg(long)]
        revoke: bool,
    },

    /// Re-save every event so its stored status matches the clock
    Refresh,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), PortalError> {
    let mut config = PortalConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(&config).await
        }
        Some(Commands::Init { force }) => cmd_init(&config.database, force),
        Some(Commands::Seed) => cmd_seed(&config.database, json_mode),
        Some(Commands::Promote { email, revoke }) => {
            cmd_promote(&config.database, &email, !revoke, json_mode)
        }
        Some(Commands::Refresh) => cmd_refresh(&config.database, json_mode),
        Some(Commands::Status) | None => cmd_status(&config.database, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "portal",
            "promote",
            "--email",
            "admin@gla.ac.in",
            "--database",
            "/tmp/portal.redb",
            "--json-mode",
        ])
        .expect("parse");
        assert!(cli.json_mode);
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/portal.redb")));
        assert!(matches!(
            cli.command,
            Some(Commands::Promote { ref email, revoke: false }) if email == "admin@gla.ac.in"
        ));
    }

    #[test]
    fn server_flags_are_optional() {
        let cli = Cli::try_parse_from(["portal", "-q", "server", "--port", "8081"]).expect("parse");
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Some(Commands::Server { host: None, port: Some(8081) })
        ));
    }
}
