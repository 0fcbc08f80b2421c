use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stil_cli::commands::{clear, export, logs, session, total, util};
use stil_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::TimeIn(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let now = util::resolve_now(args.at.as_deref())?;
            session::time_in(&mut out, &args.name, &config, now)?;
        }
        Some(Commands::TimeOut(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let now = util::resolve_now(args.at.as_deref())?;
            session::time_out(&mut out, &args.name, &config, now)?;
        }
        Some(Commands::Status(args)) => {
            let config = load_config(cli.config.as_deref())?;
            session::status(&mut out, args, &config, Local::now().naive_local())?;
        }
        Some(Commands::Logs(args)) => {
            let config = load_config(cli.config.as_deref())?;
            logs::run(&mut out, args, &config)?;
        }
        Some(Commands::Export(args)) => {
            let config = load_config(cli.config.as_deref())?;
            let today = Local::now().date_naive();
            if let Err(err) = export::run(&mut out, args, &config, today) {
                tracing::error!(error = ?err, "export failed");
                return Err(err.context("Export failed, but your data is safe."));
            }
        }
        Some(Commands::Clear(args)) => {
            let config = load_config(cli.config.as_deref())?;
            clear::run(&mut out, args, &config)?;
        }
        Some(Commands::Total(args)) => {
            // Total only reads the given files; it never touches the store
            total::run(&mut out, args)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
