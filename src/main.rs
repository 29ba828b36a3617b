mod cli;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, TraceLevel};
use earnings_calendar::service::export::{write_flattened, write_key_values, write_records};
use earnings_calendar::{flatten, parse_date, utc_string, Config, EarningsCalendar, ExportFormat};

fn init_tracing(level: Option<TraceLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(match level {
            TraceLevel::Debug => "debug",
            TraceLevel::Error => "error",
            TraceLevel::Info => "info",
            TraceLevel::Trace => "trace",
            TraceLevel::Warn => "warn",
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // stdout carries the data, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.trace);
    debug!("command line input recorded: {cli:?}");

    let mut config = Config::from_env()?;
    if let Some(ms) = cli.delay_ms {
        config.delay = Duration::from_millis(ms);
    }
    info!(
        calendar_url = %config.calendar_url,
        quote_url = %config.quote_url,
        delay_ms = config.delay.as_millis() as u64,
        "configuration loaded"
    );

    let calendar = EarningsCalendar::from_config(&config)?;
    let format = ExportFormat::from(cli.format);
    let out = cli.out.as_deref();

    match cli.command {
        Commands::Day { date } => {
            let records = calendar.fetch_day(parse_date(&date)?).await?;
            write_records(output(out)?, &records, format)?;
        }
        Commands::Range { from, to } => {
            let records = calendar
                .fetch_range(parse_date(&from)?, parse_date(&to)?)
                .await?;
            write_records(output(out)?, &records, format)?;
        }
        Commands::NextDate { ticker } => {
            let timestamp = calendar.next_earnings_timestamp(&ticker).await?;
            let record = flatten(&json!({
                "ticker": ticker,
                "earningsDate": timestamp,
                "earningsDateUTC": utc_string(timestamp),
            }));
            write_key_values(output(out)?, &record, format)?;
        }
        Commands::Info { tickers } => {
            let mut rows = Vec::with_capacity(tickers.len());
            for ticker in &tickers {
                match calendar.next_earnings_info(ticker).await {
                    Ok(info) => rows.push(flatten(&Value::Object(info))),
                    Err(err) => eprintln!("{err}"),
                }
            }
            info!("{} of {} tickers resolved", rows.len(), tickers.len());
            write_flattened(output(out)?, &rows, format)?;
        }
        Commands::Summary { ticker } => {
            let summary = calendar.next_quote_summary(&ticker).await?;
            write_key_values(output(out)?, &flatten(&Value::Object(summary)), format)?;
        }
    }

    Ok(())
}
