use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn, Instrument};

use crate::models::EarningsRecord;
use crate::service::fetch::{FetchError, PageFetcher};

use super::{lookup, CalendarError, EarningsCalendar, Result};

/// Records requested per calendar page.
pub const PAGE_SIZE: usize = 100;

const TOTAL_PATH: [&str; 6] = [
    "context",
    "dispatcher",
    "stores",
    "ScreenerCriteriaStore",
    "meta",
    "total",
];
const ROWS_PATH: [&str; 6] = [
    "context",
    "dispatcher",
    "stores",
    "ScreenerResultsStore",
    "results",
    "rows",
];

/// One calendar page: a slice of the day's records plus the day's reported total.
#[derive(Debug)]
struct Page {
    total: usize,
    records: Vec<EarningsRecord>,
}

fn parse_page(payload: &Value) -> std::result::Result<Page, FetchError> {
    let total = page_total(lookup(payload, &TOTAL_PATH)?)
        .ok_or_else(|| FetchError::MissingField(TOTAL_PATH.join(".")))?;

    let rows = lookup(payload, &ROWS_PATH)?
        .as_array()
        .ok_or_else(|| FetchError::MissingField(ROWS_PATH.join(".")))?;
    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        match EarningsRecord::deserialize(row) {
            Ok(record) => records.push(record),
            Err(err) => warn!(row = idx, error = %err, "skipping undecodable earnings row"),
        }
    }
    Ok(Page { total, records })
}

/// Any JSON number; negatives clamp to zero so they end the walk.
fn page_total(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return Some(n as usize);
    }
    value.as_f64().map(|f| f.max(0.0) as usize)
}

impl<F: PageFetcher> EarningsCalendar<F> {
    /// URL of the calendar page for `date` starting at `offset`.
    pub fn day_url(&self, date: NaiveDate, offset: usize) -> String {
        format!(
            "{}?day={}&offset={}&size={}",
            self.calendar_url,
            date.format("%Y-%m-%d"),
            offset,
            PAGE_SIZE
        )
    }

    /// Every earnings record published for `date`, first page first.
    pub async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<EarningsRecord>> {
        self.fetch_day_from(date, 0, 1).await
    }

    /// Records for `date` from `offset` on, assuming `expected_total` records
    /// until the first page says otherwise. Returns nothing without a request
    /// when `offset >= expected_total`.
    pub async fn fetch_day_from(
        &self,
        date: NaiveDate,
        offset: usize,
        expected_total: usize,
    ) -> Result<Vec<EarningsRecord>> {
        self.collect_day(date, offset, expected_total)
            .instrument(self.span.clone())
            .await
    }

    /// Earnings for every day from `from` to `to` inclusive, in date order.
    pub async fn fetch_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsRecord>> {
        if from > to {
            return Err(CalendarError::InvalidRange { from, to });
        }

        self.collect_range(from, to)
            .instrument(self.span.clone())
            .await
    }

    async fn collect_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<EarningsRecord>> {
        let mut records = Vec::new();
        for day in from.iter_days().take_while(|day| *day <= to) {
            records.extend(self.collect_day(day, 0, 1).await?);
        }
        info!(%from, %to, count = records.len(), "earnings range fetched");
        Ok(records)
    }

    async fn collect_day(
        &self,
        date: NaiveDate,
        mut offset: usize,
        mut total: usize,
    ) -> Result<Vec<EarningsRecord>> {
        let mut records = Vec::new();

        // The total is re-read from every page, so late additions extend the walk.
        while offset < total {
            let url = self.day_url(date, offset);
            debug!(%date, offset, "fetching earnings page");
            let page = parse_page(&self.get_payload(&url).await?)?;

            debug!(
                %date,
                offset,
                total = page.total,
                rows = page.records.len(),
                "earnings page parsed"
            );
            total = page.total;
            records.extend(page.records);
            offset += PAGE_SIZE;
        }

        info!(%date, count = records.len(), "earnings day fetched");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_page_total_and_rows() {
        let payload = json!({"context": {"dispatcher": {"stores": {
            "ScreenerCriteriaStore": {"meta": {"total": 2}},
            "ScreenerResultsStore": {"results": {"rows": [
                {"ticker": "A", "companyshortname": "A Co", "startdatetime": "2020-04-01T08:00:00.000-04:00",
                 "startdatetimetype": "BMO", "gmtOffsetMilliSeconds": 0},
                {"ticker": "B", "companyshortname": "B Co", "startdatetime": "2020-04-01T16:00:00.000-04:00",
                 "startdatetimetype": "AMC", "gmtOffsetMilliSeconds": 0}
            ]}}
        }}}});

        let page = parse_page(&payload).unwrap();
        assert_eq!(page.total, 2);
        let tickers: Vec<&str> = page.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, ["A", "B"]);
    }

    #[test]
    fn page_without_total_is_rejected() {
        let payload = json!({"context": {"dispatcher": {"stores": {
            "ScreenerResultsStore": {"results": {"rows": []}}
        }}}});
        let err = parse_page(&payload).unwrap_err();
        assert!(matches!(err, FetchError::MissingField(ref p) if p.ends_with("ScreenerCriteriaStore")));
    }

    #[test]
    fn non_numeric_total_is_rejected() {
        let payload = json!({"context": {"dispatcher": {"stores": {
            "ScreenerCriteriaStore": {"meta": {"total": "many"}},
            "ScreenerResultsStore": {"results": {"rows": []}}
        }}}});
        assert!(matches!(parse_page(&payload), Err(FetchError::MissingField(_))));
    }

    fn page_with(total: Value, rows: Value) -> Value {
        json!({"context": {"dispatcher": {"stores": {
            "ScreenerCriteriaStore": {"meta": {"total": total}},
            "ScreenerResultsStore": {"results": {"rows": rows}}
        }}}})
    }

    #[test]
    fn whole_float_total_is_accepted() {
        let page = parse_page(&page_with(json!(1.0), json!([]))).unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn negative_total_clamps_to_zero() {
        assert_eq!(parse_page(&page_with(json!(-5), json!([]))).unwrap().total, 0);
        assert_eq!(parse_page(&page_with(json!(-2.0), json!([]))).unwrap().total, 0);
    }

    #[test]
    fn oddly_shaped_rows_are_kept() {
        let rows = json!([
            {"ticker": "A", "startdatetime": "2020-04-01T08:00:00.000-04:00"},
            {"ticker": "B", "startdatetime": null},
            {"ticker": "C", "gmtOffsetMilliSeconds": 72000000.0}
        ]);
        let page = parse_page(&page_with(json!(3), rows)).unwrap();

        let tickers: Vec<&str> = page.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, ["A", "B", "C"]);
        assert!(page.records[1].start_datetime.is_none());
        assert_eq!(page.records[2].gmt_offset_ms, 72_000_000);
    }

    #[test]
    fn non_object_rows_are_skipped() {
        let rows = json!([{"ticker": "A"}, "garbage", 7, {"ticker": "B"}]);
        let page = parse_page(&page_with(json!(4), rows)).unwrap();

        let tickers: Vec<&str> = page.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, ["A", "B"]);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn rows_that_are_not_a_list_are_rejected() {
        let err = parse_page(&page_with(json!(1), json!({"ticker": "A"}))).unwrap_err();
        assert!(matches!(err, FetchError::MissingField(ref p) if p.ends_with("rows")));
    }
}
