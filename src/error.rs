//! Error types for workorders.

use thiserror::Error;

use crate::model::WorkItemId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("the string '{0}' is not a valid work order id value")]
    InvalidIdentity(String),

    #[error("invalid timestamp '{raw}': {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    #[error("a work order for this id '{0}' already exists, duplicates not allowed")]
    DuplicateIdentity(WorkItemId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_timestamp(raw: &str, reason: impl Into<String>) -> Self {
        Error::InvalidTimestamp {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
