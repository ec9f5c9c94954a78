use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "authlens")]
#[command(author, version, about = "Parse, filter, and inspect SSH authentication logs")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse every input line and show the outcome, valid or not
    Parse(ParseArgs),

    /// Load files and print the records matching date/IP predicates
    Filter(FilterArgs),

    /// Show the structured detail of a single record
    Inspect(InspectArgs),

    /// Summarize hosts, source IPs, and covered time span
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct ParseArgs {
    /// Log files to parse (supports glob patterns)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Maximum number of records to print
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Only show lines that failed to parse
    #[arg(long)]
    pub invalid_only: bool,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Log files to load (supports glob patterns)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Keep records at or after this date (e.g. "Jul 14 22:10:05")
    #[arg(long)]
    pub from: Option<String>,

    /// Keep records at or before this date
    #[arg(long)]
    pub to: Option<String>,

    /// Keep records whose line carries this IPv4 address
    #[arg(long)]
    pub ip: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "raw")]
    pub output: OutputFormat,

    /// Maximum number of records to print
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Log files to load (supports glob patterns)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Position of the record in the (filtered) view
    #[arg(long, short, default_value = "0")]
    pub index: usize,

    /// Look the record up by its exact raw line instead
    #[arg(long, short)]
    pub line: Option<String>,

    /// Keep records at or after this date (e.g. "Jul 14 22:10:05")
    #[arg(long)]
    pub from: Option<String>,

    /// Keep records at or before this date
    #[arg(long)]
    pub to: Option<String>,

    /// Keep records whose line carries this IPv4 address
    #[arg(long)]
    pub ip: Option<String>,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Log files to analyze (supports glob patterns)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Show top N hosts and source IPs
    #[arg(long, default_value = "10")]
    pub top: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON (one object per line)
    Json,
    /// CSV format
    Csv,
    /// Raw log lines
    Raw,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Raw => write!(f, "raw"),
        }
    }
}
