//! Clear command for bulk deletion of all sessions.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use super::util::open_engine;
use crate::Config;
use crate::lock::StoreLock;

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deletion of ALL logs.
    #[arg(long)]
    pub yes: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ClearArgs, config: &Config) -> Result<()> {
    if !args.yes {
        bail!("refusing to delete all logs without --yes");
    }

    let _lock = StoreLock::acquire(&config.database_path)?;
    let mut engine = open_engine(config)?;
    let count = engine.store().records()?.len();
    engine.store_mut().clear()?;

    tracing::info!(count, "cleared all session logs");
    writeln!(writer, "Deleted {count} log(s).")?;
    Ok(())
}
