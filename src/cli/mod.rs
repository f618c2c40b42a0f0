//! Command-line parsing for the call close-reason statistics tool.
//!
//! Argument parsing stays here; dispatch lives in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::HeaderMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "callstats", version, about = "Hourly and daily call close-reason statistics")]
pub struct Cli {
    /// Dashboard API base URL. Without it (or `CALLSTATS_API_URL`) records live in memory.
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Log level (error, warn, info, debug, trace). `RUST_LOG` directives are added on top.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Tag log lines with their source file and line.
    #[arg(long, global = true)]
    pub log_source: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import one or more call-log CSV files and print each upload result.
    Import(ImportArgs),
    /// Print the hourly close-reason table for one day.
    Summary(SummaryArgs),
    /// Export stored records for a date range as CSV.
    Export(ExportArgs),
    /// Print a summary JSON written by `callstats summary --json`.
    Show(ShowArgs),
    /// Generate a synthetic call log.
    Sample(SampleArgs),
}

/// Options shared by every command that reads call-log CSVs.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Call-log CSV file(s).
    #[arg(long = "csv", value_name = "FILE", num_args = 1..)]
    pub csv: Vec<PathBuf>,

    /// Whether line 1 is a header.
    #[arg(long, value_enum, default_value_t = HeaderMode::Auto)]
    pub header: HeaderMode,

    /// Reject inputs larger than this many bytes (default 100 MB).
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Day to summarize (YYYY-MM-DD).
    #[arg(long)]
    pub date: NaiveDate,

    /// Also list hours with no calls.
    #[arg(long)]
    pub all_hours: bool,

    /// Write the summary as JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Write the hourly table as CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// First day of the range (YYYY-MM-DD).
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day of the range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub to: NaiveDate,

    /// Output CSV path.
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Summary JSON file.
    #[arg(long, value_name = "JSON")]
    pub json: PathBuf,

    /// Also list hours with no calls.
    #[arg(long)]
    pub all_hours: bool,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Day the generated calls fall on (YYYY-MM-DD).
    #[arg(long)]
    pub date: NaiveDate,

    /// Expected number of calls over the day.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Random seed (combined with the date for reproducibility).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of calls carrying a code outside 1..=3.
    #[arg(long, default_value_t = 0.05)]
    pub unknown_share: f64,

    /// Output CSV path.
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,
}
