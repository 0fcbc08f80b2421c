//! Logs command for listing every recorded session.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use stil_core::SessionRecord;

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Output as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

const COLUMNS: [&str; 5] = ["First", "Last", "Time In", "Time Out", "Consumed"];

pub fn run<W: Write>(writer: &mut W, args: &LogsArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let records = db.load_logs()?;

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &records)?;
        writeln!(writer)?;
        return Ok(());
    }

    if records.is_empty() {
        writeln!(writer, "No logs recorded.")?;
        return Ok(());
    }

    write!(writer, "{}", render_table(&records))?;
    Ok(())
}

fn cells(record: &SessionRecord) -> [&str; 5] {
    [
        &record.first,
        &record.last,
        &record.time_in,
        &record.time_out,
        &record.consumed,
    ]
}

/// Renders records as a left-aligned table with two-space gutters.
fn render_table(records: &[SessionRecord]) -> String {
    let mut widths = COLUMNS.map(str::len);
    for record in records {
        for (width, cell) in widths.iter_mut().zip(cells(record)) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |row: [&str; 5]| {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_row(COLUMNS);
    for record in records {
        push_row(cells(record));
    }
    out
}
