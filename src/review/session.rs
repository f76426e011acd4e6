use chrono::{DateTime, Utc};

use crate::{
    backend::ReviewBackend,
    error::{ApiError, RetryError},
    review::{DecisionStore, ProgressShares, RetryBook, RetryStatus},
    types::{Decision, ItemId, JobDetails, JobId, JobStats, JobStatus, ReviewItem, SettledRetry},
};

/// Job fields owned by the backend, refreshed by polling.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    pub status: Option<JobStatus>,
    pub stats: Option<JobStats>,
    pub target_playlist_id: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl RemoteSnapshot {
    fn from_details(details: &JobDetails) -> Self {
        Self {
            status: Some(details.status),
            stats: Some(details.stats),
            target_playlist_id: details.target_playlist_id.clone(),
            refreshed_at: Some(Utc::now()),
        }
    }
}

/// Review state of one job.
///
/// Two slices live side by side: the remote snapshot, which polls replace
/// wholesale, and the locally owned decisions and retry states, which only
/// user actions change. Reads combine them; a poll never writes to the local
/// slice.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    job_id: JobId,
    items: Vec<ReviewItem>,
    decisions: DecisionStore,
    retries: RetryBook,
    remote: RemoteSnapshot,
}

impl ReviewSession {
    pub fn new(job_id: JobId, items: Vec<ReviewItem>, details: Option<&JobDetails>) -> Self {
        let decisions = DecisionStore::new(&items);
        let (retries, remote) = match details {
            Some(details) => (
                RetryBook::new(&details.missed),
                RemoteSnapshot::from_details(details),
            ),
            None => (RetryBook::default(), RemoteSnapshot::default()),
        };

        Self {
            job_id,
            items,
            decisions,
            retries,
            remote,
        }
    }

    /// Fetches job details and the items awaiting review.
    pub async fn load<B: ReviewBackend>(backend: &B, job_id: JobId) -> Result<Self, ApiError> {
        let details = backend.fetch_job(job_id).await?;
        let items = backend.fetch_review_items(job_id).await?;
        Ok(Self::new(job_id, items, Some(&details)))
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn decisions(&self) -> &DecisionStore {
        &self.decisions
    }

    pub fn retries(&self) -> &RetryBook {
        &self.retries
    }

    pub fn retries_mut(&mut self) -> &mut RetryBook {
        &mut self.retries
    }

    pub fn remote(&self) -> &RemoteSnapshot {
        &self.remote
    }

    /// Reapplies retries that succeeded in an earlier session so they stay
    /// terminal. Returns how many entries matched a missed track.
    pub fn restore_retries(&mut self, settled: &[SettledRetry]) -> usize {
        self.retries.restore(settled)
    }

    pub fn set_decision(&mut self, item_id: ItemId, decision: Decision) -> bool {
        self.decisions.set_decision(item_id, decision)
    }

    /// Replaces the remote slice with freshly fetched job details.
    pub fn apply_details(&mut self, details: &JobDetails) {
        self.remote = RemoteSnapshot::from_details(details);
    }

    /// Applies the result of a stats poll. Only the remote slice changes.
    pub fn apply_poll(&mut self, stats: JobStats) {
        self.remote.stats = Some(stats);
        self.remote.refreshed_at = Some(Utc::now());
    }

    /// Polls the backend once and applies the result.
    pub async fn refresh_stats<B: ReviewBackend>(&mut self, backend: &B) -> Result<JobStats, ApiError> {
        let stats = backend.fetch_job_stats(self.job_id).await?;
        self.apply_poll(stats);
        Ok(stats)
    }

    pub fn progress(&self) -> ProgressShares {
        self.remote
            .stats
            .as_ref()
            .map(ProgressShares::from_stats)
            .unwrap_or_default()
    }

    pub async fn submit<B: ReviewBackend>(&self, backend: &B) -> Result<usize, ApiError> {
        self.decisions.submit(backend, self.job_id).await
    }

    pub async fn retry_search<B: ReviewBackend>(
        &mut self,
        item_id: ItemId,
        backend: &B,
        top_k: u32,
    ) -> Result<RetryStatus, RetryError> {
        self.retries.search(item_id, backend, top_k).await
    }

    /// Adds a suggestion to the playlist the job created on the target provider.
    ///
    /// Fails with [`RetryError::MissingPlaylist`] before any request when the
    /// job has no target playlist yet.
    pub async fn add_suggestion<B: ReviewBackend>(
        &mut self,
        item_id: ItemId,
        suggestion_id: &str,
        backend: &B,
    ) -> Result<RetryStatus, RetryError> {
        let playlist_id = self.remote.target_playlist_id.clone();
        self.retries
            .add_suggestion(item_id, suggestion_id, playlist_id.as_deref(), backend)
            .await
    }
}
