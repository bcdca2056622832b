//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Work time tracker.
///
/// Starts and stops work intervals per project and reports how much time was
/// spent today, this week, or in any range.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
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
    /// Start tracking a project.
    Start {
        /// Project to track. Created on first use.
        project: String,
    },

    /// Stop tracking a project.
    Stop {
        /// Project to stop.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        project: Option<String>,

        /// Stop every running project.
        #[arg(long)]
        all: bool,
    },

    /// Show running projects and today's and this week's totals.
    Status,

    /// Show time per project.
    Report {
        #[command(flatten)]
        range: RangeArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show intervals split into per-day segments.
    Timeline {
        /// Start of the range (default: start of today).
        #[arg(long)]
        from: Option<String>,

        /// End of the range (default: now).
        #[arg(long)]
        to: Option<String>,
    },

    /// List the intervals touching each day of a range.
    Periods {
        /// First day (ISO 8601, YYYY-MM-DD, or relative like '2 days ago').
        #[arg(long)]
        from: String,

        /// Last day, inclusive.
        #[arg(long)]
        to: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Range selection for reports.
#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Report on today.
    #[arg(long, conflicts_with_all = ["week", "from"])]
    pub day: bool,

    /// Report on this week (default).
    #[arg(long, conflicts_with = "from")]
    pub week: bool,

    /// Start of a custom range (ISO 8601, YYYY-MM-DD, or relative like '2 hours ago').
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End of a custom range, exclusive.
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}
