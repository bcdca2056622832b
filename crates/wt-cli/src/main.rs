use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::util::parse_datetime;
use wt_cli::commands::{SqliteTracker, periods, report, start, status, stop, timeline};
use wt_cli::{Cli, Commands, Config, RangeArgs};
use wt_core::{Calendar, Tracker};

/// Load config and open the tracker, ensuring the database directory exists.
fn open_tracker(config_path: Option<&Path>) -> Result<SqliteTracker<Local>> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wt_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Tracker::open(db, Calendar::local(config.week_start)).context("failed to load open intervals")
}

fn report_period(
    range: &RangeArgs,
    calendar: &Calendar<Local>,
    now: chrono::DateTime<Utc>,
) -> Result<report::Period> {
    if let (Some(from), Some(to)) = (&range.from, &range.to) {
        return Ok(report::Period::Range {
            start: parse_datetime(from, calendar, now)?,
            end: parse_datetime(to, calendar, now)?,
        });
    }
    Ok(if range.day {
        report::Period::Day
    } else {
        report::Period::Week
    })
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

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let now = Utc::now();
    let mut tracker = open_tracker(cli.config.as_deref())?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Start { project } => start::run(&mut out, &mut tracker, project, now)?,
        Commands::Stop { project, all } => {
            let target = match project {
                Some(project) if !*all => stop::Target::Project(project),
                _ => stop::Target::All,
            };
            stop::run(&mut out, &mut tracker, target, now)?;
        }
        Commands::Status => status::run(&mut out, &mut tracker, now)?,
        Commands::Report { range, json } => {
            let period = report_period(range, tracker.calendar(), now)?;
            report::run(&mut out, &tracker, period, *json, now)?;
        }
        Commands::Timeline { from, to } => {
            let from = match from {
                Some(from) => parse_datetime(from, tracker.calendar(), now)?,
                None => parse_datetime("today", tracker.calendar(), now)?,
            };
            let to = match to {
                Some(to) => parse_datetime(to, tracker.calendar(), now)?,
                None => now,
            };
            timeline::run(&mut out, &tracker, from, to, now)?;
        }
        Commands::Periods { from, to, json } => {
            let from = parse_datetime(from, tracker.calendar(), now)?;
            let to = parse_datetime(to, tracker.calendar(), now)?;
            periods::run(&mut out, &tracker, from, to, *json, now)?;
        }
    }

    Ok(())
}
