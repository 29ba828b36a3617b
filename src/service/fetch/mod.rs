use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

/// Marker line under which the page embeds its application state.
const APP_MAIN_PREFIX: &str = "root.App.main = ";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("page body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("no `root.App.main` payload found in page")]
    MissingPayload,
    #[error("embedded payload is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("payload field `{0}` is missing or has an unexpected type")]
    MissingField(String),
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

/// Source of decoded page payloads.
///
/// The calendar only talks to the outside world through this trait, so tests
/// and alternative transports can stand in for [`HttpPageFetcher`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        (**self).fetch(url).await
    }
}

/// Fetches pages over HTTP and decodes the embedded `root.App.main` state.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(config.http_timeout, &config.user_agent)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        debug!(%url, %status, "page response received");
        if !status.is_success() {
            warn!(%url, %status, "page request returned error status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = resp.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        let page = String::from_utf8(body.to_vec())?;

        extract_app_main(&page)
    }
}

/// Pull the JSON assigned to `root.App.main` out of a page's source.
///
/// The assignment sits on a line of its own and ends with `;`.
pub fn extract_app_main(page: &str) -> Result<Value, FetchError> {
    let line = page
        .lines()
        .find(|row| row.starts_with(APP_MAIN_PREFIX))
        .ok_or(FetchError::MissingPayload)?;

    let raw = line[APP_MAIN_PREFIX.len()..].trim_end();
    let raw = raw.strip_suffix(';').unwrap_or(raw);

    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_embedded_state() {
        let page = "<html>\n<script>\n(function (root) {\n\
                    root.App.main = {\"context\":{\"dispatcher\":{\"stores\":{}}}};\n\
                    }(this));\n</script>\n</html>";

        let value = extract_app_main(page).unwrap();
        assert!(value["context"]["dispatcher"]["stores"].is_object());
    }

    #[test]
    fn tolerates_crlf_and_missing_semicolon() {
        let page = "root.App.main = {\"a\":1}\r\nother();";
        let value = extract_app_main(page).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn missing_marker_is_reported() {
        let err = extract_app_main("<html><body>nothing here</body></html>").unwrap_err();
        assert!(matches!(err, FetchError::MissingPayload));
    }

    #[test]
    fn indented_marker_is_not_matched() {
        let err = extract_app_main("    root.App.main = {};").unwrap_err();
        assert!(matches!(err, FetchError::MissingPayload));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = extract_app_main("root.App.main = {\"a\":;").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn builds_client_from_config() {
        assert!(HttpPageFetcher::from_config(&Config::default()).is_ok());
    }
}
