//! Priority tiers and the time-decaying rank function.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::WorkItemId;

const PRIORITY_DIVISOR: i64 = 3;
const VIP_DIVISOR: i64 = 5;

/// Rank floor for VIP work orders.
pub const VIP_FLOOR: f64 = 4.0;
/// Rank floor for PRIORITY work orders.
pub const PRIORITY_FLOOR: f64 = 3.0;
/// Rank of every MANAGEMENT_OVERRIDE work order. No other tier can reach it:
/// the largest possible wait is bounded by the span of a four-digit year.
pub const MANAGEMENT_OVERRIDE_RANK: f64 = f64::MAX;

/// Priority class of a work order, derived from its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Id divisible by neither 3 nor 5.
    Normal,
    /// Id divisible by 3, not by 5.
    Priority,
    /// Id divisible by 5, not by 3.
    Vip,
    /// Id divisible by 15.
    ManagementOverride,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Normal => "NORMAL",
            Tier::Priority => "PRIORITY",
            Tier::Vip => "VIP",
            Tier::ManagementOverride => "MANAGEMENT_OVERRIDE",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(Tier::Normal),
            "PRIORITY" => Ok(Tier::Priority),
            "VIP" => Ok(Tier::Vip),
            "MANAGEMENT_OVERRIDE" => Ok(Tier::ManagementOverride),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

impl From<WorkItemId> for Tier {
    fn from(id: WorkItemId) -> Self {
        classify(id)
    }
}

/// Classify a validated id. Total: every `WorkItemId` is at least 1.
pub fn classify(id: WorkItemId) -> Tier {
    let value = id.get();
    match (value % PRIORITY_DIVISOR == 0, value % VIP_DIVISOR == 0) {
        (true, true) => Tier::ManagementOverride,
        (true, false) => Tier::Priority,
        (false, true) => Tier::Vip,
        (false, false) => Tier::Normal,
    }
}

/// Classify a raw numeric id, failing with `InvalidIdentity` below 1.
pub fn classify_value(value: i64) -> Result<Tier> {
    WorkItemId::new(value)
        .map(classify)
        .map_err(|_| Error::InvalidIdentity(value.to_string()))
}

/// `wait * ln(wait)`, clamped to zero where the log term is not positive.
fn wait_log_wait(wait: f64) -> f64 {
    if wait <= 1.0 || wait.is_nan() {
        0.0
    } else {
        wait * wait.ln()
    }
}

/// Rank of a work order of `tier` that has waited `wait_seconds`.
///
/// Higher ranks are served first. `wait_seconds` may be zero or negative
/// when the reference instant precedes the arrival.
pub fn rank(tier: Tier, wait_seconds: f64) -> f64 {
    match tier {
        Tier::ManagementOverride => MANAGEMENT_OVERRIDE_RANK,
        Tier::Vip => VIP_FLOOR.max(2.0 * wait_log_wait(wait_seconds)),
        Tier::Priority => PRIORITY_FLOOR.max(wait_log_wait(wait_seconds)),
        Tier::Normal => wait_seconds,
    }
}
