//! # CLI Module
//!
//! User-facing commands of `plmcli`. Each command builds an [`HttpBackend`]
//! from the environment, drives the review engine in [`crate::review`] and
//! reports through the crate's `info!`, `success!`, `warning!` and `error!`
//! macros.
//!
//! ## Commands
//!
//! ### Imports
//!
//! - [`playlists`] - Playlists of the connected source account
//! - [`create_import`] - Queues an import job per source playlist
//! - [`jobs`] - All jobs with status, target and match rate
//!
//! ### Jobs
//!
//! - [`job`] - Summary of a job, its progress shares and the tracks without match
//! - [`status`] - Job counters, optionally polled until the backend is idle
//!
//! ### Review
//!
//! - [`list_review`] - Uncertain matches with their draft decisions
//! - [`decide`] - Records confirm/reject decisions in the local draft
//! - [`submit`] - Sends the draft batch to the backend
//! - [`finalize`] - Starts the playlist build on the target provider
//!
//! ### Retry
//!
//! - [`retry`] - Second-chance search for missed tracks, optionally adding a pick
//!
//! ## Error Handling
//!
//! Failures that only concern one track are printed as warnings next to that
//! track. Failures that leave the command without anything to show end the
//! program through `error!`. A failed submit keeps the draft on disk so the
//! user can simply run the command again.
//!
//! ## Usage Patterns
//!
//! ```bash
//! plmcli playlists                         # pick source playlists
//! plmcli import create --playlists 37i9dQZF1DXcBWIGoYBM5M --target tidal
//! plmcli jobs                               # overview of all jobs
//! plmcli status 42 --watch                  # wait for the matcher
//! plmcli review 42                          # inspect uncertain matches
//! plmcli review 42 decide --confirm 7,9 --reject 8
//! plmcli review 42 submit                   # send "Submit 3 Decisions"
//! plmcli retry 42 --all                     # re-search every missed track
//! plmcli retry 42 --item 13 --query "Teardrop Massive Attack" --pick abc123
//! plmcli review 42 finalize
//! ```

mod imports;
mod job;
mod retry;
mod review;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{backend::HttpBackend, error};

pub use imports::create_import;
pub use imports::jobs;
pub use imports::playlists;
pub use job::job;
pub use job::status;
pub use retry::RetryOptions;
pub use retry::retry;
pub use review::decide;
pub use review::finalize;
pub use review::list_review;
pub use review::submit;

fn backend() -> HttpBackend {
    match HttpBackend::from_env() {
        Ok(backend) => backend,
        Err(e) => error!("Cannot set up backend client: {}", e),
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
