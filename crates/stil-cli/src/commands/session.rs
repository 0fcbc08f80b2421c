//! Time-in, time-out and status commands for a single student.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Args;

use stil_core::time::{format_duration, parse_instant};

use super::util::open_engine;
use crate::Config;
use crate::lock::StoreLock;

/// A student's name as typed at the desk.
#[derive(Debug, Args)]
pub struct NameArgs {
    /// First name.
    pub first: String,
    /// Last name.
    pub last: String,
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub name: NameArgs,

    /// Record the event at this time instead of now (DD/MM/YYYY HH:MM:SS).
    #[arg(long)]
    pub at: Option<String>,
}

/// Opens a session.
pub fn time_in<W: Write>(
    writer: &mut W,
    args: &NameArgs,
    config: &Config,
    now: NaiveDateTime,
) -> Result<()> {
    let _lock = StoreLock::acquire(&config.database_path)?;
    let mut engine = open_engine(config)?;
    let record = engine.time_in(&args.first, &args.last, now)?;
    writeln!(writer, "Timed In")?;
    writeln!(writer, "{} {} at {}", record.first, record.last, record.time_in)?;
    Ok(())
}

/// Closes the open session.
pub fn time_out<W: Write>(
    writer: &mut W,
    args: &NameArgs,
    config: &Config,
    now: NaiveDateTime,
) -> Result<()> {
    let _lock = StoreLock::acquire(&config.database_path)?;
    let mut engine = open_engine(config)?;
    let record = engine.time_out(&args.first, &args.last, now)?;
    writeln!(writer, "Timed Out")?;
    writeln!(
        writer,
        "{} {} at {} (consumed {})",
        record.first, record.last, record.time_out, record.consumed
    )?;
    Ok(())
}

/// Reports whether a session is open.
pub fn status<W: Write>(
    writer: &mut W,
    args: &NameArgs,
    config: &Config,
    now: NaiveDateTime,
) -> Result<()> {
    let engine = open_engine(config)?;
    let Some(open) = engine.open_session(&args.first, &args.last)? else {
        writeln!(
            writer,
            "{} {} has no open session.",
            args.first.trim(),
            args.last.trim()
        )?;
        return Ok(());
    };

    write!(
        writer,
        "{} {} timed in at {}",
        open.first, open.last, open.time_in
    )?;
    // Elapsed time is best effort; a corrupt or future time-in just omits it.
    match parse_instant(&open.time_in).map(|start| format_duration(start, now)) {
        Ok(Ok(elapsed)) => writeln!(writer, " ({elapsed} elapsed).")?,
        _ => writeln!(writer, ".")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use stil_core::SessionError;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn jane() -> NameArgs {
        NameArgs {
            first: "Jane".to_string(),
            last: "Doe".to_string(),
        }
    }

    #[test]
    fn time_in_then_time_out_after_minimum_stay() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());
        let mut output = Vec::new();

        time_in(&mut output, &jane(), &config, at(10, 0)).unwrap();
        time_out(&mut output, &jane(), &config, at(10, 15)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Timed In
        Jane Doe at 01/01/2024 10:00:00
        Timed Out
        Jane Doe at 01/01/2024 10:15:00 (consumed 0 hrs 15 mins 0 secs)
        ");
    }

    #[test]
    fn early_time_out_reports_minutes_remaining() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());
        let mut output = Vec::new();

        time_in(&mut output, &jane(), &config, at(10, 0)).unwrap();
        let err = time_out(&mut output, &jane(), &config, at(10, 10)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Minimum stay is 15 mins. Wait 5 more minute(s)."
        );
        assert!(matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::MinimumStayNotMet {
                minutes_remaining: 5,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_time_in_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());
        let mut output = Vec::new();

        time_in(&mut output, &jane(), &config, at(10, 0)).unwrap();
        let err = time_in(&mut output, &jane(), &config, at(10, 5)).unwrap_err();
        assert!(err.to_string().contains("already have an active session"));
    }

    #[test]
    fn status_reports_open_session() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());
        let mut sink = Vec::new();
        time_in(&mut sink, &jane(), &config, at(9, 30)).unwrap();

        let mut output = Vec::new();
        status(&mut output, &jane(), &config, at(10, 45)).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"Jane Doe timed in at 01/01/2024 09:30:00 (1 hrs 15 mins 0 secs elapsed).");
    }

    #[test]
    fn status_reports_no_session() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(temp.path());

        let mut output = Vec::new();
        status(&mut output, &jane(), &config, at(10, 0)).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"Jane Doe has no open session.");
    }
}
