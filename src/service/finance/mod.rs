use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, Span};

use crate::config::Config;
use crate::service::fetch::{FetchError, HttpPageFetcher, PageFetcher};

pub mod earnings;
pub mod quotes;

pub use earnings::PAGE_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("from-date {from} should not be after to-date {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
    #[error("invalid date `{input}`, expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Any failure of a per-ticker lookup; the underlying cause stays reachable
    /// through [`std::error::Error::source`].
    #[error("Invalid symbol or unavailable earnings data for {ticker}")]
    Unavailable {
        ticker: String,
        #[source]
        source: FetchError,
    },
}

impl CalendarError {
    /// True for errors caused by the caller's arguments rather than the remote side.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidRange { .. } | Self::InvalidDate { .. })
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;

/// Earnings calendar and quote-summary scraper.
///
/// Requests are issued strictly one after another, each preceded by a fixed
/// delay. Log events are emitted inside the span the calendar holds.
pub struct EarningsCalendar<F = HttpPageFetcher> {
    fetcher: F,
    calendar_url: String,
    quote_url: String,
    delay: Duration,
    span: Span,
}

impl EarningsCalendar<HttpPageFetcher> {
    /// Build a calendar backed by HTTP with default settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpPageFetcher::from_config(config)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: PageFetcher> EarningsCalendar<F> {
    pub fn with_fetcher(fetcher: F, config: &Config) -> Self {
        Self {
            fetcher,
            calendar_url: config.calendar_url.trim_end_matches('/').to_string(),
            quote_url: config.quote_url.trim_end_matches('/').to_string(),
            delay: config.delay,
            span: tracing::info_span!("earnings_calendar"),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Use `span` as the parent context for every log event of this calendar.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Rate-limited fetch of one decoded page.
    async fn get_payload(&self, url: &str) -> std::result::Result<Value, FetchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!(%url, "fetching page");
        self.fetcher.fetch(url).await
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|source| {
        CalendarError::InvalidDate {
            input: input.to_string(),
            source,
        }
    })
}

/// Render Unix seconds as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn utc_string(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Walk `path` from `root`; numeric segments index into arrays.
fn lookup<'a>(root: &'a Value, path: &[&str]) -> std::result::Result<&'a Value, FetchError> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        let next = match current {
            Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            other => other.get(*key),
        };
        current = next.ok_or_else(|| FetchError::MissingField(path[..=depth].join(".")))?;
    }
    Ok(current)
}

/// Integer at `path`, accepting whole-valued floats the way the pages sometimes encode them.
fn lookup_i64(root: &Value, path: &[&str]) -> std::result::Result<i64, FetchError> {
    let value = lookup(root, path)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v as i64))
        .ok_or_else(|| FetchError::MissingField(path.join(".")))
}
