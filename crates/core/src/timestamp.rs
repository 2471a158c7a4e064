//! Timestamp normalization for loosely-typed date values.
//!
//! Dates reach the service in several wire shapes: RFC 3339 strings, bare
//! calendar dates, epoch milliseconds, `{ "seconds": .., "nanoseconds": .. }`
//! objects, and those same objects stringified a second time after passing
//! through a cache or another JSON boundary. Every converter funnels through
//! [`normalize`] so the shapes are interpreted in exactly one place.
//!
//! The contract is total: any input yields either a UTC timestamp or `None`.
//! `None` means "unknown date" and must never be read as the epoch.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::types::Timestamp;

/// Naive date-time layouts tried for strings with an ISO date prefix.
const ISO_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-carrying layouts that are not strict RFC 3339 (e.g. Postgres text output).
const ISO_OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Calendar-date layouts accepted by the generic fallback parser.
const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// A value that can be converted into a [`Timestamp`] without further context.
///
/// Implemented for chrono's own types (which convert directly) and for the
/// loosely-typed inputs (`serde_json::Value`, `str`) which go through
/// [`normalize`] / [`parse_str`].
pub trait AsTimestamp {
    fn as_timestamp(&self) -> Option<Timestamp>;
}

impl AsTimestamp for DateTime<Utc> {
    fn as_timestamp(&self) -> Option<Timestamp> {
        Some(*self)
    }
}

impl AsTimestamp for DateTime<FixedOffset> {
    fn as_timestamp(&self) -> Option<Timestamp> {
        Some(self.with_timezone(&Utc))
    }
}

impl AsTimestamp for NaiveDateTime {
    fn as_timestamp(&self) -> Option<Timestamp> {
        Some(self.and_utc())
    }
}

impl AsTimestamp for NaiveDate {
    fn as_timestamp(&self) -> Option<Timestamp> {
        self.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
    }
}

impl AsTimestamp for Value {
    fn as_timestamp(&self) -> Option<Timestamp> {
        normalize(self)
    }
}

impl AsTimestamp for str {
    fn as_timestamp(&self) -> Option<Timestamp> {
        parse_str(self)
    }
}

impl AsTimestamp for String {
    fn as_timestamp(&self) -> Option<Timestamp> {
        parse_str(self)
    }
}

impl<T: AsTimestamp + ?Sized> AsTimestamp for &T {
    fn as_timestamp(&self) -> Option<Timestamp> {
        (**self).as_timestamp()
    }
}

impl<T: AsTimestamp> AsTimestamp for Option<T> {
    fn as_timestamp(&self) -> Option<Timestamp> {
        self.as_ref().and_then(AsTimestamp::as_timestamp)
    }
}

/// Normalize an arbitrary JSON value into a UTC timestamp.
///
/// | Shape                                   | Interpretation                  |
/// |-----------------------------------------|---------------------------------|
/// | `"2024-03-01"`, `"2024-03-01T10:00:00Z"` | calendar date / date-time       |
/// | `"Mar 1, 2024"`, RFC 2822               | generic date parsing            |
/// | `1709251200000`                         | epoch milliseconds              |
/// | `{"seconds": 1709251200, "nanoseconds": 0}` | seconds × 1000 + nanos / 1e6 |
/// | `"{\"seconds\":1709251200}"`            | parsed, then as above           |
///
/// Everything else (`null`, booleans, arrays, `{}`) yields `None`.
pub fn normalize(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n.as_f64().and_then(from_epoch_millis),
        Value::Object(map) => from_seconds_object(map),
        Value::Null | Value::Bool(_) | Value::Array(_) => None,
    }
}

/// Parse a date string in any of the accepted textual shapes.
pub fn parse_str(raw: &str) -> Option<Timestamp> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if has_iso_date_prefix(s) || s.contains("T00:00:00") {
        if let Some(ts) = parse_iso(s) {
            return Some(ts);
        }
    }

    if s.starts_with('{') {
        return serde_json::from_str::<Map<String, Value>>(s)
            .ok()
            .and_then(|map| from_seconds_object(&map));
    }

    parse_generic(s)
}

/// Convert epoch milliseconds into a timestamp, rejecting non-finite and
/// out-of-range values.
pub fn from_epoch_millis(millis: f64) -> Option<Timestamp> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

/// Interpret a `{ seconds, nanoseconds }` object (either the plain or the
/// underscore-prefixed field names). `seconds` must be an integer.
fn from_seconds_object(map: &Map<String, Value>) -> Option<Timestamp> {
    let seconds = map
        .get("seconds")
        .or_else(|| map.get("_seconds"))?
        .as_i64()?;

    let nanos = match map.get("nanoseconds").or_else(|| map.get("_nanoseconds")) {
        None | Some(Value::Null) => 0,
        Some(v) => v.as_i64()?,
    };
    if !(0..1_000_000_000).contains(&nanos) {
        return None;
    }

    let millis = seconds.checked_mul(1000)?.checked_add(nanos / 1_000_000)?;
    DateTime::from_timestamp_millis(millis)
}

/// `true` when the string starts with `YYYY-MM-DD`.
pub fn has_iso_date_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
}

fn parse_iso(s: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ISO_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ISO_NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.as_timestamp())
}

fn parse_generic(s: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    GENERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.as_timestamp())
}

// ---------------------------------------------------------------------------
// Serde adapters
// ---------------------------------------------------------------------------

/// Read one loose date value. `Err` carries the input that could not be
/// interpreted; `null` and blank strings are `Ok(None)`.
fn read_loose(value: Value) -> Result<Option<Timestamp>, Value> {
    match value {
        Value::Null => Ok(None),
        Value::String(ref s) if s.trim().is_empty() => Ok(None),
        other => normalize(&other).map(Some).ok_or(other),
    }
}

/// `deserialize_with` adapter for `Option<Timestamp>` fields that accept any
/// shape [`normalize`] understands.
///
/// Never fails on content: `null`, blanks and values that cannot be
/// interpreted all become `None`. Unrecognized values are logged at `warn`.
pub mod loose_option {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::types::Timestamp;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(super::read_loose(value).unwrap_or_else(|raw| {
            tracing::warn!(value = %raw, "Unrecognized date value, treating as unknown");
            None
        }))
    }
}

/// `deserialize_with` adapter for update DTOs that must tell "absent" from
/// "explicitly cleared". Pair with `#[serde(default)]`:
///
/// - field missing → `None` (leave unchanged)
/// - `null` / `""` → `Some(None)` (clear)
/// - date value    → `Some(Some(ts))`
/// - unrecognized  → `None` (leave unchanged, logged at `warn`)
pub mod loose_patch {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::types::Timestamp;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<Timestamp>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match super::read_loose(value) {
            Ok(ts) => Some(ts),
            Err(raw) => {
                tracing::warn!(value = %raw, "Unrecognized date value, leaving unchanged");
                None
            }
        })
    }

    /// Helper so `Option<Option<_>>` fields can be constructed in tests and
    /// call sites without nested `Some`.
    pub fn set(ts: Timestamp) -> Option<Option<Timestamp>> {
        Some(Some(ts))
    }

    /// Marker for "clear this date".
    pub fn clear() -> Option<Option<Timestamp>> {
        Some(None)
    }
}
