//! Core data model.
//!
//! A work order has an identity, an arrival instant and a tier derived from
//! the identity. Its rank is a function of tier and time spent waiting, so
//! it is computed on demand and never stored.

pub mod id;
pub mod tier;
pub mod timestamp;
pub mod work;

pub use id::{WorkItemId, is_valid_id, parse_id};
pub use tier::{Tier, classify, classify_value, rank};
pub use timestamp::{
    Timestamp, format_timestamp, is_timestamp_format, parse_reference, parse_timestamp,
    parse_timestamp_at,
};
pub use work::{WorkItem, rank_order, sort_ranked};
