//! Runtime settings, read from the environment (and `.env` via `dotenv` in the binary).

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_CALENDAR_URL: &str = "https://finance.yahoo.com/calendar/earnings";
pub const DEFAULT_QUOTE_URL: &str = "https://finance.yahoo.com/quote";
/// Requests allowed per hour; the delay between requests is derived from it.
pub const DEFAULT_RATE_LIMIT: f64 = 2000.0;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_AGENT: &str = concat!("earnings-calendar/", env!("CARGO_PKG_VERSION"));

pub const CALENDAR_URL_VAR: &str = "EARNINGS_CALENDAR_URL";
pub const QUOTE_URL_VAR: &str = "EARNINGS_QUOTE_URL";
pub const RATE_LIMIT_VAR: &str = "EARNINGS_RATE_LIMIT";
pub const DELAY_MS_VAR: &str = "EARNINGS_DELAY_MS";
pub const HTTP_TIMEOUT_VAR: &str = "EARNINGS_HTTP_TIMEOUT_SECS";
pub const USER_AGENT_VAR: &str = "EARNINGS_USER_AGENT";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is set but empty")]
    Empty(&'static str),
    #[error("{key} must be {expected}, got `{value}`")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the day-by-day earnings calendar.
    pub calendar_url: String,
    /// Base URL of per-ticker quote pages.
    pub quote_url: String,
    /// Fixed pause before every request.
    pub delay: Duration,
    pub http_timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar_url: DEFAULT_CALENDAR_URL.to_string(),
            quote_url: DEFAULT_QUOTE_URL.to_string(),
            delay: delay_for_rate_limit(DEFAULT_RATE_LIMIT),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Build from process environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `EARNINGS_DELAY_MS` wins over
    /// `EARNINGS_RATE_LIMIT` when both are set.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(raw) => {
                    let trimmed = raw.trim();
                    if trimmed.is_empty() {
                        return Err(ConfigError::Empty(key));
                    }
                    Ok(Some(trimmed.to_string()))
                }
            }
        };

        let mut config = Self::default();

        if let Some(url) = read(CALENDAR_URL_VAR)? {
            config.calendar_url = url;
        }
        if let Some(url) = read(QUOTE_URL_VAR)? {
            config.quote_url = url;
        }
        if let Some(raw) = read(RATE_LIMIT_VAR)? {
            let rate = raw
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite() && *r > 0.0)
                .ok_or(ConfigError::Invalid {
                    key: RATE_LIMIT_VAR,
                    value: raw,
                    expected: "a positive number of requests per hour",
                })?;
            config.delay = delay_for_rate_limit(rate);
        }
        if let Some(raw) = read(DELAY_MS_VAR)? {
            let ms = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: DELAY_MS_VAR,
                value: raw,
                expected: "a whole number of milliseconds",
            })?;
            config.delay = Duration::from_millis(ms);
        }
        if let Some(raw) = read(HTTP_TIMEOUT_VAR)? {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid {
                    key: HTTP_TIMEOUT_VAR,
                    value: raw,
                    expected: "a positive number of seconds",
                })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = read(USER_AGENT_VAR)? {
            config.user_agent = agent;
        }

        Ok(config)
    }
}

/// Pause needed between requests to stay within `requests_per_hour`.
pub fn delay_for_rate_limit(requests_per_hour: f64) -> Duration {
    Duration::from_secs_f64(3600.0 / requests_per_hour)
}
