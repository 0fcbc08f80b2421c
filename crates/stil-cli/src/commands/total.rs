//! Total command for summing a student's time across exported CSV files.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stil_core::{Aggregate, Identity, decode_all, total_duration};

#[derive(Debug, Args)]
pub struct TotalArgs {
    /// Student first name (matched ignoring case).
    pub first: String,
    /// Student last name (matched ignoring case).
    pub last: String,
    /// Exported CSV files to read.
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,
}

pub fn run<W: Write>(writer: &mut W, args: &TotalArgs) -> Result<Aggregate> {
    let identity = Identity::new(&args.first, &args.last)?;

    let mut texts = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        // Tables saved by spreadsheet tools may carry stray non-UTF-8 bytes
        texts.push(String::from_utf8_lossy(&bytes).into_owned());
    }

    let tables = decode_all(&texts);
    let aggregate = total_duration(&tables, &identity);

    if aggregate.skipped_rows > 0 {
        writeln!(
            writer,
            "Skipped {} malformed row(s).",
            aggregate.skipped_rows
        )?;
    }

    if !aggregate.has_matches() {
        writeln!(writer, "No records found for this student.")?;
        return Ok(aggregate);
    }

    writeln!(writer, "Total Time: {}", aggregate.duration_text())?;
    writeln!(
        writer,
        "Matched {} record(s) across {} file(s).",
        aggregate.matched_rows,
        args.files.len()
    )?;
    Ok(aggregate)
}
