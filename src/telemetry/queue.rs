//! Span helpers for queue operations.

use tracing::Span;

/// Start a span for one repository operation.
///
/// `queue.outcome` is declared empty and filled in by [`record_outcome`].
pub fn start_queue_span(operation: &'static str) -> Span {
    tracing::debug_span!(
        "queue.operation",
        "queue.operation" = operation,
        "queue.outcome" = tracing::field::Empty,
    )
}

/// Record how an operation ended (e.g. "ok", "empty", "not_found").
pub fn record_outcome(span: &Span, outcome: &str) {
    span.record("queue.outcome", outcome);
}
