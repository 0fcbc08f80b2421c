//! Library attendance tracker CLI library.
//!
//! This crate provides the CLI interface for the attendance tracker.

mod cli;
pub mod commands;
mod config;
pub mod lock;

pub use cli::{Cli, Commands};
pub use config::Config;
