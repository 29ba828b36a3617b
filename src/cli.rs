use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use earnings_calendar::ExportFormat;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,

    /// Output format.
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Write output to this file instead of stdout.
    #[arg(short, long, global = true)]
    pub out: Option<PathBuf>,

    /// Pause before every request, in milliseconds (overrides EARNINGS_DELAY_MS).
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Earnings calendar for one day (YYYY-MM-DD).
    Day { date: String },

    /// Earnings calendar for every day between two dates, inclusive.
    Range { from: String, to: String },

    /// Next earnings date of a ticker, as a Unix timestamp and in UTC.
    NextDate { ticker: String },

    /// Next earnings info for each ticker, flattened into one row per ticker.
    ///
    /// Tickers that fail are reported on stderr and skipped.
    Info {
        #[arg(required = true)]
        tickers: Vec<String>,
    },

    /// Full quote summary of a ticker, flattened into key/value rows.
    Summary { ticker: String },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    Debug,
    Error,
    Info,
    Trace,
    Warn,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
        }
    }
}
