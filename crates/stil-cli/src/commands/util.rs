//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};

use stil_core::SessionEngine;
use stil_core::time::parse_instant;
use stil_db::Database;

use crate::Config;

/// Resolves the effective "now" for a command.
///
/// Accepts an override in the canonical `DD/MM/YYYY HH:MM:SS` form;
/// otherwise uses the local wall clock.
pub fn resolve_now(at: Option<&str>) -> Result<NaiveDateTime> {
    match at {
        Some(text) => parse_instant(text).with_context(|| {
            format!("invalid --at value {text:?}, expected DD/MM/YYYY HH:MM:SS")
        }),
        None => Ok(Local::now().naive_local()),
    }
}

/// Opens the configured database, ensuring the parent directory exists.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Opens a session engine over the configured database.
pub fn open_engine(config: &Config) -> Result<SessionEngine<Database>> {
    let policy = config
        .session_policy()
        .context("invalid min_stay_minutes in configuration")?;
    let db = open_database(config)?;
    Ok(SessionEngine::with_policy(db, policy))
}
