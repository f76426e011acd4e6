//! # Match Review Engine
//!
//! Client-side state for reviewing the outcome of an import job:
//!
//! - [`DecisionStore`] - confirm/reject verdicts for uncertain matches and the
//!   batch that is submitted to the backend
//! - [`RetryBook`] / [`RetryState`] - second-chance search for tracks the
//!   matcher missed, with a guarded state machine per track
//! - [`ProgressShares`] - percentages derived from job counters
//! - [`ReviewSession`] - ties the above to one job and keeps backend-owned
//!   fields apart from user-owned ones

mod decisions;
mod progress;
mod retry;
mod session;

pub use decisions::DecisionStore;
pub use progress::ProgressShares;
pub use retry::AddRequest;
pub use retry::RetryBook;
pub use retry::RetryState;
pub use retry::RetryStatus;
pub use retry::SearchRequest;
pub use session::RemoteSnapshot;
pub use session::ReviewSession;
