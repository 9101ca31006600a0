//! Work order identity.
//!
//! Ids arrive as decimal strings and must denote a value in
//! `[1, i64::MAX]`. The grammar check rejects signs, whitespace, leading
//! zeros and anything longer than 19 digits; the numeric parse then
//! enforces the exact upper bound.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Positive decimal integer, no leading zero, at most 19 digits.
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{0,18}$").expect("Invalid id regex"));

/// Canonical work order identity, in `[1, 9223372036854775807]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkItemId(i64);

impl WorkItemId {
    pub const MIN: WorkItemId = WorkItemId(1);
    pub const MAX: WorkItemId = WorkItemId(i64::MAX);

    /// Build an id from a numeric value. Fails for values below 1.
    pub fn new(value: i64) -> Result<Self> {
        if value < 1 {
            return Err(Error::InvalidIdentity(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WorkItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_id(s)
    }
}

impl TryFrom<i64> for WorkItemId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

// Decimal string on the wire: the full range does not survive a round trip
// through an f64-backed JSON number.
impl Serialize for WorkItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse the external string form of a work order id.
pub fn parse_id(raw: &str) -> Result<WorkItemId> {
    if !ID_REGEX.is_match(raw) {
        return Err(Error::InvalidIdentity(raw.to_string()));
    }
    // 19-digit strings above i64::MAX pass the grammar; the parse overflows.
    raw.parse::<i64>()
        .map(WorkItemId)
        .map_err(|_| Error::InvalidIdentity(raw.to_string()))
}

/// Whether `raw` would be accepted by [`parse_id`].
pub fn is_valid_id(raw: &str) -> bool {
    parse_id(raw).is_ok()
}
