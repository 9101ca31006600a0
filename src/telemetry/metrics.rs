//! Metric instrument factories for workorders.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a provider the instruments are no-ops.

use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};

fn meter() -> Meter {
    opentelemetry::global::meter("workorders")
}

/// Counter: work orders offered to the queue.
/// Labels: `tier`, `result` ("ok" | "duplicate" | "invalid").
pub fn work_submitted() -> Counter<u64> {
    meter()
        .u64_counter("workorders.queue.submitted")
        .with_description("Number of work orders submitted")
        .build()
}

/// Counter: queue operations (pop, list, delete, position, mean_wait).
/// Labels: `operation`.
pub fn queue_operations() -> Counter<u64> {
    meter()
        .u64_counter("workorders.queue.operations")
        .with_description("Number of queue operations")
        .build()
}

/// Up/down counter tracking the number of queued work orders.
pub fn queue_depth() -> UpDownCounter<i64> {
    meter()
        .i64_up_down_counter("workorders.queue.depth")
        .with_description("Number of work orders currently queued")
        .build()
}

/// Histogram: operation duration in milliseconds.
/// Labels: `operation`.
pub fn operation_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("workorders.operation.duration_ms")
        .with_description("Queue operation duration in milliseconds")
        .with_unit("ms")
        .build()
}
