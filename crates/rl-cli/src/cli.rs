//! CLI argument definitions for the reading-list exporter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "leganto-export",
    version,
    about = "Convert online reading lists into a library-platform import file",
    long_about = "Convert a university's online reading-list records into the\n\
                  fixed-column CSV import file consumed by the library-services\n\
                  platform. Course attribution comes from a tab-separated\n\
                  catalogue feed; owner usernames from a directory snapshot."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export reading lists to the import file.
    Export(ExportArgs),

    /// Print the import-file column schema.
    Columns,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Tab-separated course catalogue feed.
    #[arg(long = "feed", value_name = "PATH")]
    pub feed: PathBuf,

    /// Feed field delimiter.
    #[arg(long = "feed-delimiter", value_name = "CHAR", default_value = "\t")]
    pub feed_delimiter: char,

    /// Directory of resolved list documents, one <code>.json per list.
    #[arg(long = "lists-dir", value_name = "DIR")]
    pub lists_dir: PathBuf,

    /// "All lists" report export used to enumerate list URIs.
    #[arg(long = "report", value_name = "PATH")]
    pub report: PathBuf,

    /// Restrict the report to these time periods (repeatable).
    #[arg(long = "time-period", value_name = "PERIOD")]
    pub time_periods: Vec<String>,

    /// Directory snapshot used for owner-username resolution.
    #[arg(long = "directory", value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Disable the in-memory email-to-username cache.
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Skip owner-username resolution even when a directory is configured.
    #[arg(long = "no-owner-lookup")]
    pub no_owner_lookup: bool,

    /// Emit rows for items with no attached resource as well.
    #[arg(long = "all-items")]
    pub all_items: bool,

    /// Continue with the remaining lists when one fails to resolve.
    #[arg(long = "skip-failed-lists")]
    pub skip_failed_lists: bool,

    /// Degrade directory failures to empty owner usernames instead of
    /// aborting the run.
    #[arg(long = "ignore-directory-errors")]
    pub ignore_directory_errors: bool,

    /// Output path for the import file.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = "import.csv"
    )]
    pub output: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
