use std::path::{Path, PathBuf};

use crate::{
    config,
    error::DraftError,
    management::drafts_file,
    review::RetryBook,
    types::{JobId, SettledRetry},
};

/// Retries of a job that ended with a track on the target playlist.
///
/// Kept next to the decision draft as `drafts/retry_<id>.json`. A retry that
/// succeeded in an earlier run is restored as `Success`, so the same track is
/// never added to the playlist twice.
pub struct RetryLedger {
    path: PathBuf,
    settled: Vec<SettledRetry>,
}

impl RetryLedger {
    pub fn new(job_id: JobId) -> Self {
        Self::with_dir(config::data_dir(), job_id)
    }

    pub fn with_dir(base: impl AsRef<Path>, job_id: JobId) -> Self {
        Self {
            path: drafts_file(base.as_ref(), format!("retry_{}.json", job_id)),
            settled: Vec::new(),
        }
    }

    pub async fn load(job_id: JobId) -> Result<Self, DraftError> {
        Self::load_from(config::data_dir(), job_id).await
    }

    pub async fn load_from(base: impl AsRef<Path>, job_id: JobId) -> Result<Self, DraftError> {
        let mut ledger = Self::with_dir(base, job_id);
        if !ledger.path.is_file() {
            return Ok(ledger);
        }

        let json = async_fs::read_to_string(&ledger.path).await?;
        ledger.settled = serde_json::from_str(&json)?;
        Ok(ledger)
    }

    pub async fn persist(&self) -> Result<(), DraftError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.settled)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn settled(&self) -> &[SettledRetry] {
        &self.settled
    }

    /// Adds the items of `book` that succeeded since the ledger was loaded.
    /// Returns how many new entries were recorded.
    pub fn record_from(&mut self, book: &RetryBook) -> usize {
        let before = self.settled.len();
        for entry in book.settled() {
            if !self.settled.iter().any(|s| s.item_id == entry.item_id) {
                self.settled.push(entry);
            }
        }
        self.settled.len() - before
    }
}
