//! CLI subcommand implementations.

pub mod clear;
pub mod export;
pub mod logs;
pub mod session;
pub mod total;
pub mod util;
