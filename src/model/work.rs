//! Work order entity and its ranking order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::model::id::{WorkItemId, parse_id};
use crate::model::tier::{Tier, classify, rank};
use crate::model::timestamp::{Timestamp, parse_timestamp_at};

/// A queued work order. Immutable once built; its rank is recomputed from
/// the wait time on every query.
#[derive(Debug, Clone, Serialize)]
pub struct WorkItem {
    id: WorkItemId,
    arrival: Timestamp,
    tier: Tier,
}

impl WorkItem {
    /// Validate raw input against the current wall clock.
    pub fn new(raw_id: &str, raw_arrival: &str) -> Result<Self> {
        Self::new_at(raw_id, raw_arrival, Utc::now())
    }

    /// Validate raw input, rejecting arrivals later than `now`.
    ///
    /// The id is checked first, so a bad id wins over a bad timestamp.
    pub fn new_at(raw_id: &str, raw_arrival: &str, now: DateTime<Utc>) -> Result<Self> {
        let id = parse_id(raw_id)?;
        let tier = classify(id);
        let arrival = parse_timestamp_at(raw_arrival, now)?;
        Ok(Self { id, arrival, tier })
    }

    pub fn id(&self) -> WorkItemId {
        self.id
    }

    pub fn arrival(&self) -> Timestamp {
        self.arrival
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Seconds waited as of now.
    pub fn wait_seconds(&self) -> i64 {
        self.wait_seconds_at(Utc::now())
    }

    /// Seconds waited as of `reference`. Negative if it precedes arrival.
    pub fn wait_seconds_at(&self, reference: DateTime<Utc>) -> i64 {
        self.arrival.seconds_until(reference)
    }

    pub fn rank(&self) -> f64 {
        self.rank_at(Utc::now())
    }

    pub fn rank_at(&self, reference: DateTime<Utc>) -> f64 {
        rank(self.tier, self.wait_seconds_at(reference) as f64)
    }
}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WorkItem {}

impl std::hash::Hash for WorkItem {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorkItem{{id={}, arrival={}, tier={}}}",
            self.id, self.arrival, self.tier
        )
    }
}

/// Queue order of two work orders as seen at `reference`.
///
/// 1. Higher rank first.
/// 2. Equal rank: longer wait (earlier arrival) first. Arrivals carry whole
///    seconds, so this compares waits at second granularity.
/// 3. Lower id first, so the order is total.
pub fn rank_order(a: &WorkItem, b: &WorkItem, reference: DateTime<Utc>) -> Ordering {
    order_by_rank(a.rank_at(reference), a, b.rank_at(reference), b)
}

fn order_by_rank(rank_a: f64, a: &WorkItem, rank_b: f64, b: &WorkItem) -> Ordering {
    rank_b
        .total_cmp(&rank_a)
        .then_with(|| a.arrival.cmp(&b.arrival))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort work orders into queue order as seen at `reference`.
///
/// Ranks are computed once per item rather than once per comparison.
pub fn sort_ranked(items: Vec<WorkItem>, reference: DateTime<Utc>) -> Vec<WorkItem> {
    let mut keyed: Vec<(f64, WorkItem)> = items
        .into_iter()
        .map(|item| (item.rank_at(reference), item))
        .collect();
    keyed.sort_by(|(ra, a), (rb, b)| order_by_rank(*ra, a, *rb, b));
    keyed.into_iter().map(|(_, item)| item).collect()
}
