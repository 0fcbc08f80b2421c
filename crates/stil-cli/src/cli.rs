//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::clear::ClearArgs;
use crate::commands::export::ExportArgs;
use crate::commands::logs::LogsArgs;
use crate::commands::session::{NameArgs, SessionArgs};
use crate::commands::total::TotalArgs;

/// Library attendance tracker.
///
/// Records student time-in and time-out at the library desk, exports the
/// attendance log and totals time spent per student across exports.
#[derive(Debug, Parser)]
#[command(name = "stil", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a session for a student.
    TimeIn(SessionArgs),

    /// Close a student's open session.
    TimeOut(SessionArgs),

    /// Show whether a student currently has an open session.
    Status(NameArgs),

    /// List all recorded sessions.
    Logs(LogsArgs),

    /// Write all sessions to a dated CSV file.
    Export(ExportArgs),

    /// Delete all recorded sessions.
    Clear(ClearArgs),

    /// Total a student's time across exported CSV files.
    Total(TotalArgs),
}
