//! Starting imports and looking at existing jobs.
//!
//! The backend schedules and runs jobs on its own. This module only asks it
//! to queue new ones and summarizes what it reports back.

use crate::{
    backend::ReviewBackend,
    error::ApiError,
    types::{JobId, JobStatus, JobSummary, Provider},
    utils,
};

/// Queues an import of `playlist_ids` into `target`.
///
/// Ids are trimmed and deduplicated first. When nothing is left the call fails
/// with `Validation` without contacting the backend.
pub async fn start_import<B: ReviewBackend>(
    backend: &B,
    playlist_ids: &[String],
    target: Provider,
) -> Result<Vec<JobId>, ApiError> {
    let ids = utils::normalize_playlist_ids(playlist_ids);
    if ids.is_empty() {
        return Err(ApiError::Validation(
            "at least one source playlist id is required".to_string(),
        ));
    }

    backend.create_import(&ids, target).await
}

/// All jobs of the user, newest first. Jobs without a creation time go last.
pub async fn job_overview<B: ReviewBackend>(backend: &B) -> Result<Vec<JobSummary>, ApiError> {
    let mut jobs = backend.list_jobs().await?;
    jobs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    Ok(jobs)
}

/// Number of jobs per status, in lifecycle order, leaving out empty ones.
pub fn count_by_status(jobs: &[JobSummary]) -> Vec<(JobStatus, usize)> {
    [
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::WaitingReview,
        JobStatus::Importing,
        JobStatus::Done,
        JobStatus::Failed,
    ]
    .into_iter()
    .map(|status| (status, jobs.iter().filter(|job| job.status == status).count()))
    .filter(|(_, count)| *count > 0)
    .collect()
}
