//! Configuration management for the playlist migration CLI.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Every setting has a default so a fresh
//! install can talk to a backend running on localhost.
//!
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_RETRY_TOP_K: u32 = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Loads environment variables from the `.env` file in the local data directory.
///
/// The file lives at:
/// - Linux: `~/.local/share/plmcli/.env`
/// - macOS: `~/Library/Application Support/plmcli/.env`
/// - Windows: `%LOCALAPPDATA%/plmcli/.env`
///
/// A missing file is not an error since every setting has a default. Variables
/// already present in the environment are not overwritten.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing `.env`
/// file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Root of all files `plmcli` keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("plmcli");
    path
}

fn env_path() -> PathBuf {
    data_dir().join(".env")
}

/// Base URL of the migration backend, without a trailing slash.
pub fn backend_url() -> String {
    let url = env::var("PLMCLI_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
    url.trim_end_matches('/').to_string()
}

/// Bearer token for the backend, if one is configured and non-empty.
pub fn api_token() -> Option<String> {
    env::var("PLMCLI_API_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
}

/// Number of candidates requested per retry search.
pub fn retry_top_k() -> u32 {
    env::var("PLMCLI_RETRY_TOP_K")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|k| *k > 0)
        .unwrap_or(DEFAULT_RETRY_TOP_K)
}

/// Delay between two job status polls.
pub fn poll_interval() -> Duration {
    let secs = env::var("PLMCLI_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
    Duration::from_secs(secs)
}
