#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use earnings_calendar::{Config, EarningsCalendar, FetchError, PageFetcher};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const CALENDAR_URL: &str = "https://example.test/calendar/earnings";
pub const QUOTE_URL: &str = "https://example.test/quote";

/// Serves canned payloads by URL and records every request in order.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, Value>,
    offline: bool,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetcher whose every request fails at the transport level.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, payload: Value) -> Self {
        self.pages.insert(url.into(), payload);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.offline {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        self.pages.get(url).cloned().ok_or(FetchError::MissingPayload)
    }
}

pub fn test_config() -> Config {
    Config {
        calendar_url: CALENDAR_URL.to_string(),
        quote_url: QUOTE_URL.to_string(),
        delay: std::time::Duration::ZERO,
        ..Config::default()
    }
}

pub fn calendar(fetcher: FakeFetcher) -> EarningsCalendar<FakeFetcher> {
    EarningsCalendar::with_fetcher(fetcher, &test_config())
}

pub fn day_url(day: &str, offset: usize) -> String {
    format!("{CALENDAR_URL}?day={day}&offset={offset}&size=100")
}

pub fn row(ticker: &str, day: &str) -> Value {
    json!({
        "ticker": ticker,
        "companyshortname": format!("{ticker} Corp"),
        "startdatetime": format!("{day}T16:00:00.000-04:00"),
        "startdatetimetype": "AMC",
        "epsestimate": 1.25,
        "epsactual": null,
        "epssurprisepct": null,
        "gmtOffsetMilliSeconds": -14400000
    })
}

/// `count` rows named `<prefix>0..`, all scheduled on `day`.
pub fn rows(prefix: &str, day: &str, count: usize) -> Vec<Value> {
    (0..count).map(|i| row(&format!("{prefix}{i}"), day)).collect()
}

pub fn day_page(total: usize, rows: Vec<Value>) -> Value {
    json!({"context": {"dispatcher": {"stores": {
        "ScreenerCriteriaStore": {"meta": {"total": total}},
        "ScreenerResultsStore": {"results": {"rows": rows}}
    }}}})
}

pub fn quote_page(summary: Value) -> Value {
    json!({"context": {"dispatcher": {"stores": {"QuoteSummaryStore": summary}}}})
}
