//! Error types shared across the crate.
//!
//! - [`ApiError`] covers everything that can go wrong talking to the backend.
//!   An empty search result is not an error and never shows up here.
//! - [`RetryError`] is returned when a retry transition is not allowed from
//!   the item's current state.
//! - [`DraftError`] covers reading and writing local review drafts and the
//!   submit that settles one.

use thiserror::Error;

use crate::{review::RetryStatus, types::ItemId};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failed before a response arrived
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend rejected the payload shape or content
    #[error("Validation error: {0}")]
    Validation(String),

    /// Job, item or playlist is unknown to the backend
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Backend returned {status}: {body}")]
    Server { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// Configured backend address is not an absolute http(s) URL
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// The task driving the request ended before it settled
    #[error("Request interrupted: {0}")]
    Interrupted(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryError {
    #[error("Item {0} has no retry state")]
    UnknownItem(ItemId),

    #[error("Query is locked while the item is {0}")]
    QueryLocked(RetryStatus),

    #[error("Item is {0}, a suggestion can only be picked while it is pending")]
    NotAwaitingSelection(RetryStatus),

    #[error("Suggestion {0} was not offered for this item")]
    UnknownSuggestion(String),

    #[error("Job has not created a target playlist yet")]
    MissingPlaylist,
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to (de)serialize draft: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// Backend did not take the batch, the draft was kept
    #[error("Submitting decisions failed: {0}")]
    Submit(ApiError),
}
