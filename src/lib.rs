//! # workorders
//!
//! In-memory work order queue. Work orders are classified into priority
//! tiers from their id and served in an order that weighs tier against
//! time spent waiting, so low-priority work eventually surfaces.
//!
//! [`repository::Repository`] is the shared store; everything under
//! [`model`] is pure.

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod telemetry;

pub use error::{Error, Result};
pub use repository::Repository;
