//! # portal
//!
//! The One Portal application: HTTP API, CLI and configuration over
//! `portal-core`.

pub mod api;
pub mod cli;
pub mod config;
