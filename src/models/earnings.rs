use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One company's earnings event as listed on the calendar for a given day.
///
/// Field names on the wire follow the calendar page's row layout, e.g.
///
/// ```json
/// {
///     "ticker": "AMS.S",
///     "companyshortname": "Ams AG",
///     "startdatetime": "2017-04-23T20:00:00.000-04:00",
///     "startdatetimetype": "TAS",
///     "epsestimate": null,
///     "epsactual": null,
///     "epssurprisepct": null,
///     "gmtOffsetMilliSeconds": 72000000
/// }
/// ```
///
/// Rows are taken as the page serves them: a field that is missing, `null`
/// or of an unexpected shape decodes to its empty value instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ticker: String,
    #[serde(rename = "companyshortname", default, deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(rename = "startdatetime", default, deserialize_with = "lenient_datetime")]
    pub start_datetime: Option<DateTime<FixedOffset>>,
    #[serde(rename = "startdatetimetype", default, deserialize_with = "lenient_string")]
    pub start_datetime_type: String, // e.g. TAS, BMO, AMC
    #[serde(rename = "epsestimate", default, deserialize_with = "lenient_f64")]
    pub eps_estimate: Option<f64>,
    #[serde(rename = "epsactual", default, deserialize_with = "lenient_f64")]
    pub eps_actual: Option<f64>,
    #[serde(rename = "epssurprisepct", default, deserialize_with = "lenient_f64")]
    pub eps_surprise_pct: Option<f64>,
    #[serde(rename = "gmtOffsetMilliSeconds", default, deserialize_with = "lenient_i64")]
    pub gmt_offset_ms: i64,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok()))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(Value::as_f64))
}

// Offsets arrive as integers or as whole-valued floats like `72000000.0`.
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or_default())
}
