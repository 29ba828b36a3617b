use std::future::Future;

use serde_json::{Map, Value};
use tracing::{info, warn, Instrument};

use crate::service::fetch::{FetchError, PageFetcher};

use super::{lookup, lookup_i64, utc_string, CalendarError, EarningsCalendar, Result};

type LookupResult<T> = std::result::Result<T, FetchError>;

const QUOTE_SUMMARY_PATH: [&str; 4] = ["context", "dispatcher", "stores", "QuoteSummaryStore"];
const EARNINGS_PATH: [&str; 2] = ["calendarEvents", "earnings"];
const EARNINGS_DATE_RAW_PATH: [&str; 3] = ["earningsDate", "0", "raw"];

impl<F: PageFetcher> EarningsCalendar<F> {
    /// URL of the quote page for `ticker`.
    pub fn quote_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.quote_url, ticker)
    }

    /// Unix timestamp (seconds) of the next earnings date of `ticker`.
    pub async fn next_earnings_timestamp(&self, ticker: &str) -> Result<i64> {
        self.collapse(ticker, self.earnings_timestamp(ticker)).await
    }

    /// The `calendarEvents.earnings` block of `ticker`, with `ticker` and
    /// `earningsDateUTC` added.
    pub async fn next_earnings_info(&self, ticker: &str) -> Result<Map<String, Value>> {
        self.collapse(ticker, self.earnings_info(ticker)).await
    }

    /// The whole quote summary of `ticker`, with `ticker` added.
    pub async fn next_quote_summary(&self, ticker: &str) -> Result<Map<String, Value>> {
        self.collapse(ticker, self.tagged_quote_summary(ticker)).await
    }

    async fn quote_summary(&self, ticker: &str) -> LookupResult<Map<String, Value>> {
        let payload = self.get_payload(&self.quote_url(ticker)).await?;
        Ok(as_object(lookup(&payload, &QUOTE_SUMMARY_PATH)?, &QUOTE_SUMMARY_PATH)?.clone())
    }

    async fn earnings_timestamp(&self, ticker: &str) -> LookupResult<i64> {
        let summary = Value::Object(self.quote_summary(ticker).await?);
        let earnings = lookup(&summary, &EARNINGS_PATH)?;
        lookup_i64(earnings, &EARNINGS_DATE_RAW_PATH)
    }

    async fn earnings_info(&self, ticker: &str) -> LookupResult<Map<String, Value>> {
        let summary = Value::Object(self.quote_summary(ticker).await?);
        let earnings = lookup(&summary, &EARNINGS_PATH)?;

        let timestamp = lookup_i64(earnings, &EARNINGS_DATE_RAW_PATH)?;
        let utc = utc_string(timestamp).ok_or(FetchError::InvalidTimestamp(timestamp))?;

        let mut info = as_object(earnings, &EARNINGS_PATH)?.clone();
        info.insert("ticker".to_string(), Value::String(ticker.to_string()));
        info.insert("earningsDateUTC".to_string(), Value::String(utc));
        Ok(info)
    }

    async fn tagged_quote_summary(&self, ticker: &str) -> LookupResult<Map<String, Value>> {
        let mut summary = self.quote_summary(ticker).await?;
        summary.insert("ticker".to_string(), Value::String(ticker.to_string()));
        Ok(summary)
    }

    /// Run a lookup for `ticker`, folding every failure into `Unavailable`.
    async fn collapse<T, Fut>(&self, ticker: &str, attempt: Fut) -> Result<T>
    where
        Fut: Future<Output = LookupResult<T>>,
    {
        match attempt.instrument(self.span.clone()).await {
            Ok(value) => {
                self.span
                    .in_scope(|| info!(%ticker, "quote lookup succeeded"));
                Ok(value)
            }
            Err(source) => {
                self.span
                    .in_scope(|| warn!(%ticker, error = %source, "quote lookup failed"));
                Err(CalendarError::Unavailable {
                    ticker: ticker.to_string(),
                    source,
                })
            }
        }
    }
}

fn as_object<'a>(value: &'a Value, path: &[&str]) -> LookupResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| FetchError::MissingField(path.join(".")))
}
