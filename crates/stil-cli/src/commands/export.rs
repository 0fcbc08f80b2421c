//! Implementation of the `stil export` command.
//!
//! Writes every session record to `STILibrary MM-DD-YYYY.csv` in the export
//! directory. Export only reads the store; a failed write leaves the
//! persisted sessions untouched.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use stil_core::records::{encode, export_filename};

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory to write the CSV into (defaults to the configured export dir).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// What an export run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The store held no records, so no file was written.
    Empty,
    Written { path: PathBuf, rows: usize },
}

/// Runs the export command for the given export date.
pub fn run<W: Write>(
    writer: &mut W,
    args: &ExportArgs,
    config: &Config,
    today: NaiveDate,
) -> Result<ExportOutcome> {
    let db = open_database(config)?;
    let records = db.load_logs()?;

    if records.is_empty() {
        writeln!(writer, "There are no logs to export yet.")?;
        return Ok(ExportOutcome::Empty);
    }

    let dir = args.output_dir.as_ref().unwrap_or(&config.export_dir);
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let path = dir.join(export_filename(today));
    fs::write(&path, encode(&records))
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = records.len(), "exported session logs");
    writeln!(
        writer,
        "Exported {} record(s) to {}",
        records.len(),
        path.display()
    )?;
    Ok(ExportOutcome::Written {
        path,
        rows: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use stil_core::SessionEngine;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn seed(config: &Config) {
        let mut engine = SessionEngine::new(open_database(config).unwrap());
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        engine
            .time_in("Jane", "Doe", day.and_hms_opt(10, 0, 0).unwrap())
            .unwrap();
        engine
            .time_out("Jane", "Doe", day.and_hms_opt(11, 0, 0).unwrap())
            .unwrap();
    }

    #[test]
    fn export_writes_dated_csv() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());
        seed(&config);

        let mut output = Vec::new();
        let outcome = run(&mut output, &ExportArgs { output_dir: None }, &config, today()).unwrap();

        let expected = config.export_dir.join("STILibrary 01-02-2024.csv");
        assert_eq!(
            outcome,
            ExportOutcome::Written {
                path: expected.clone(),
                rows: 1
            }
        );
        let csv = fs::read_to_string(expected).unwrap();
        assert_eq!(
            csv,
            "First,Last,Time In,Time Out,Consumed\n\
             \"Jane\",\"Doe\",\"01/01/2024 10:00:00\",\"01/01/2024 11:00:00\",\"1 hrs 0 mins 0 secs\"\n"
        );
    }

    #[test]
    fn export_of_empty_store_is_informational() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());

        let mut output = Vec::new();
        let outcome = run(&mut output, &ExportArgs { output_dir: None }, &config, today()).unwrap();

        assert_eq!(outcome, ExportOutcome::Empty);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "There are no logs to export yet.\n"
        );
        assert!(!config.export_dir.exists());
    }

    #[test]
    fn failed_write_keeps_data_safe() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());
        seed(&config);
        let before = open_database(&config).unwrap().load_logs().unwrap();

        // A regular file where the output directory should be.
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let args = ExportArgs {
            output_dir: Some(blocker),
        };

        let mut output = Vec::new();
        assert!(run(&mut output, &args, &config, today()).is_err());

        let after = open_database(&config).unwrap().load_logs().unwrap();
        assert_eq!(before, after);
    }
}
