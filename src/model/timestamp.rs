//! UTC timestamps in the exact `YYYY-MM-DDTHH:mm:ssZ` form.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Shape only; calendar validity is checked by the parse that follows.
static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z$")
        .expect("Invalid timestamp regex")
});

/// A UTC instant with second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Truncates any sub-second part.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self(instant.with_nanosecond(0).unwrap_or(instant))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Whole seconds from `self` to `reference`, truncated toward zero.
    /// Negative when `reference` is earlier.
    pub fn seconds_until(&self, reference: DateTime<Utc>) -> i64 {
        (reference - self.0).num_seconds()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse an arrival timestamp, rejecting instants after the current time.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    parse_timestamp_at(raw, Utc::now())
}

/// Parse an arrival timestamp, rejecting instants after `now`.
pub fn parse_timestamp_at(raw: &str, now: DateTime<Utc>) -> Result<Timestamp> {
    let ts = parse_reference(raw)?;
    if ts.0 > now {
        return Err(Error::invalid_timestamp(
            raw,
            "instants in the future are not allowed",
        ));
    }
    Ok(ts)
}

/// Parse a timestamp without the future-instant check.
///
/// Used for reference instants of aggregate queries, which may
/// legitimately lie ahead of the clock.
pub fn parse_reference(raw: &str) -> Result<Timestamp> {
    if !TIMESTAMP_REGEX.is_match(raw) {
        return Err(Error::invalid_timestamp(
            raw,
            "expected the form YYYY-MM-DDTHH:mm:ssZ",
        ));
    }
    let naive = NaiveDateTime::parse_from_str(raw, FORMAT)
        .map_err(|e| Error::invalid_timestamp(raw, format!("not a calendar instant: {e}")))?;
    // chrono accepts second 60 as a leap second; the external form does not.
    if naive.nanosecond() != 0 {
        return Err(Error::invalid_timestamp(raw, "leap seconds are not accepted"));
    }
    Ok(Timestamp(naive.and_utc()))
}

/// Render a timestamp in the external form. Inverse of [`parse_reference`].
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_string()
}

/// Whether `raw` has the external shape, regardless of calendar validity.
pub fn is_timestamp_format(raw: &str) -> bool {
    TIMESTAMP_REGEX.is_match(raw)
}
