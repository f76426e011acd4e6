//! Playlist Migration Review CLI Library
//!
//! This library is the client side of a playlist migration service. The backend
//! owns authentication, catalog search, fuzzy matching and job execution; this
//! crate fetches job state over HTTP, lets a user confirm or reject uncertain
//! track matches, re-search tracks the backend could not match, and submits the
//! resulting decisions.
//!
//! # Modules
//!
//! - `backend` - Capability trait for the migration backend and its HTTP client
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types shared across the crate
//! - `imports` - Starting imports and the job overview
//! - `management` - Local persistence of review drafts and settled retries
//! - `review` - Match review engine (decisions, retry flow, progress)
//! - `types` - Data structures and type definitions
//! - `utils` - Formatting and parsing helpers
//!
//! # Example
//!
//! ```
//! use plmcli::{backend::HttpBackend, config, review::ReviewSession, types::JobId};
//!
//! #[tokio::main]
//! async fn main() -> plmcli::Res<()> {
//!     config::load_env().await?;
//!     let backend = HttpBackend::from_env()?;
//!     let session = ReviewSession::load(&backend, JobId(42)).await?;
//!     println!("{} items awaiting review", session.items().len());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod imports;
pub mod management;
pub mod review;
pub mod types;
pub mod utils;

/// A convenient Result type alias for top-level operations that may fail.
///
/// Library code returns the typed errors from [`error`]; this alias is used
/// where several of them meet, such as `main` and configuration bootstrap.
/// The boxed error keeps `Send + Sync` bounds for async contexts.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching job {}", job_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Submitted {} decisions", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates with exit code 1 after printing. Only use this for failures the
/// current command cannot recover from.
///
/// # Example
///
/// ```
/// error!("Job {} not found", job_id);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for localized failures, e.g. a single track whose retry search failed,
/// that should be visible without aborting the command.
///
/// # Example
///
/// ```
/// warning!("Retry search for item {} failed: {}", item_id, err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
