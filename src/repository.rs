//! In-memory work order repository.
//!
//! The only stateful component. Items are keyed by id in a map guarded by
//! a single `RwLock`: mutations (add, pop, delete) hold the write lock for
//! their whole check-then-act sequence, while queries clone a snapshot
//! under the read lock and rank it after releasing the lock.
//!
//! Ranks are never cached. Every query ranks a fresh snapshot against the
//! clock's current instant.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::model::{Timestamp, WorkItem, WorkItemId, parse_reference, rank_order, sort_ranked};
use crate::telemetry::metrics;
use crate::telemetry::queue::{record_outcome, start_queue_span};

/// Shared, thread-safe work order store. Wrap in an `Arc` to share.
pub struct Repository {
    items: RwLock<HashMap<WorkItemId, WorkItem>>,
    clock: Arc<dyn Clock>,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    /// Empty repository on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty repository that reads "now" from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            clock,
        }
    }

    // Each critical section is a single map operation over immutable
    // values, so a panic elsewhere cannot leave the map inconsistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<WorkItemId, WorkItem>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<WorkItemId, WorkItem>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<WorkItem> {
        self.read().values().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Validate and enqueue a new work order.
    ///
    /// Fails with `InvalidIdentity` / `InvalidTimestamp` on bad input and
    /// with `DuplicateIdentity` if the id is already queued. The store is
    /// unchanged on failure.
    pub fn add(&self, raw_id: &str, raw_arrival: &str) -> Result<WorkItem> {
        let started = Instant::now();
        let span = start_queue_span("add");
        let _enter = span.enter();
        debug!(id = raw_id, arrival = raw_arrival, "add");

        let item = match WorkItem::new_at(raw_id, raw_arrival, self.clock.now()) {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "rejected work order");
                record_outcome(&span, "invalid");
                metrics::work_submitted().add(1, &[KeyValue::new("result", "invalid")]);
                return Err(e);
            }
        };
        let tier = KeyValue::new("tier", item.tier().as_str());

        match self.write().entry(item.id()) {
            Entry::Occupied(_) => {
                warn!(id = %item.id(), "duplicate work order id");
                record_outcome(&span, "duplicate");
                metrics::work_submitted().add(1, &[tier, KeyValue::new("result", "duplicate")]);
                return Err(Error::DuplicateIdentity(item.id()));
            }
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
            }
        }

        info!(%item, "work order queued");
        record_outcome(&span, "ok");
        metrics::work_submitted().add(1, &[tier, KeyValue::new("result", "ok")]);
        metrics::queue_depth().add(1, &[]);
        observe("add", started);
        Ok(item)
    }

    /// Remove and return the highest-ranked work order, or `None` if empty.
    ///
    /// Selection and removal happen under one write lock, so concurrent
    /// callers never receive the same item.
    pub fn pop_next(&self) -> Option<WorkItem> {
        let started = Instant::now();
        let span = start_queue_span("pop_next");
        let _enter = span.enter();

        let popped = {
            let mut items = self.write();
            let reference = self.clock.now();
            let top = items
                .values()
                .min_by(|a, b| rank_order(a, b, reference))
                .map(WorkItem::id);
            top.and_then(|id| items.remove(&id))
        };

        metrics::queue_operations().add(1, &[KeyValue::new("operation", "pop_next")]);
        observe("pop_next", started);
        match popped {
            Some(item) => {
                info!(%item, "work order dequeued");
                record_outcome(&span, "ok");
                metrics::queue_depth().add(-1, &[]);
                Some(item)
            }
            None => {
                debug!("queue empty");
                record_outcome(&span, "empty");
                None
            }
        }
    }

    /// Remove a work order by id. Returns the removed item, if any.
    pub fn delete(&self, id: WorkItemId) -> Option<WorkItem> {
        let started = Instant::now();
        let span = start_queue_span("delete");
        let _enter = span.enter();

        let removed = self.write().remove(&id);

        metrics::queue_operations().add(1, &[KeyValue::new("operation", "delete")]);
        observe("delete", started);
        match &removed {
            Some(item) => {
                info!(%item, "work order deleted");
                record_outcome(&span, "ok");
                metrics::queue_depth().add(-1, &[]);
            }
            None => {
                debug!(%id, "delete of unknown work order");
                record_outcome(&span, "not_found");
            }
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All queued work orders in queue order, as of now.
    pub fn ranked(&self) -> Vec<WorkItem> {
        sort_ranked(self.snapshot(), self.clock.now())
    }

    /// Ids of all queued work orders in queue order.
    pub fn list_ids(&self) -> Vec<WorkItemId> {
        let started = Instant::now();
        let ids: Vec<WorkItemId> = self.ranked().iter().map(WorkItem::id).collect();
        debug!(count = ids.len(), "list_ids");
        metrics::queue_operations().add(1, &[KeyValue::new("operation", "list")]);
        observe("list", started);
        ids
    }

    /// Zero-based position of `id` in queue order, or `None` if not queued.
    pub fn position_of(&self, id: WorkItemId) -> Option<usize> {
        let started = Instant::now();
        let position = self.ranked().iter().position(|item| item.id() == id);
        debug!(%id, ?position, "position_of");
        metrics::queue_operations().add(1, &[KeyValue::new("operation", "position")]);
        observe("position", started);
        position
    }

    /// Mean wait, in seconds, at the reference instant given in external form.
    ///
    /// See [`Repository::mean_wait_time_at`].
    pub fn mean_wait_time(&self, raw_reference: &str) -> Result<f64> {
        let reference = parse_reference(raw_reference).inspect_err(|e| {
            warn!(error = %e, "rejected reference timestamp");
        })?;
        Ok(self.mean_wait_time_at(reference))
    }

    /// Mean wait, in seconds, of the work orders that arrived at or before
    /// `reference`. Later arrivals are left out entirely. `0.0` when
    /// nothing qualifies.
    pub fn mean_wait_time_at(&self, reference: Timestamp) -> f64 {
        let started = Instant::now();
        let reference = reference.as_datetime();

        let (sum, count) = self
            .snapshot()
            .iter()
            .map(|item| item.wait_seconds_at(reference))
            .filter(|wait| *wait >= 0)
            .fold((0.0_f64, 0_u64), |(sum, count), wait| (sum + wait as f64, count + 1));

        let mean = if count > 0 { sum / count as f64 } else { 0.0 };
        if count == 0 {
            debug!("no work orders arrived at or before the reference instant");
        }
        debug!(mean, count, "mean_wait_time");
        metrics::queue_operations().add(1, &[KeyValue::new("operation", "mean_wait")]);
        observe("mean_wait", started);
        mean
    }

    /// Look up a queued work order without removing it.
    pub fn get(&self, id: WorkItemId) -> Option<WorkItem> {
        self.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

fn observe(operation: &'static str, started: Instant) {
    metrics::operation_duration_ms().record(
        started.elapsed().as_secs_f64() * 1000.0,
        &[KeyValue::new("operation", operation)],
    );
}
