//! Earnings calendar and quote-summary scraper.
//!
//! [`EarningsCalendar`] walks the paged day-by-day earnings calendar and reads
//! per-ticker quote summaries through a [`PageFetcher`]; [`flatten`] turns any
//! nested payload into a single-level [`FlattenedRecord`] for tabular output.

pub mod config;
pub mod models;
pub mod service;

pub use config::{Config, ConfigError};
pub use models::{EarningsRecord, FlattenedRecord};
pub use service::export::{ExportError, ExportFormat};
pub use service::fetch::{extract_app_main, FetchError, HttpPageFetcher, PageFetcher};
pub use service::finance::{
    parse_date, utc_string, CalendarError, EarningsCalendar, Result, PAGE_SIZE,
};
pub use service::flatten::{flatten, Flattener};
