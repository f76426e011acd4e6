use crate::{
    backend::{HttpBackend, check_status, decode},
    error::ApiError,
    types::{JobDetails, JobId, JobStats, JobSummary, JobsResponse},
};

/// Lists all import jobs of the user, newest first.
///
/// Uses `GET /api/imports`. Each entry carries item counters so the overview
/// can show a match rate without fetching every job.
pub async fn list_jobs(backend: &HttpBackend) -> Result<Vec<JobSummary>, ApiError> {
    let response = backend.get(&["imports"]).send().await?;
    let response = check_status(response, "jobs").await?;
    let json = decode::<JobsResponse>(response).await?;
    Ok(json.jobs)
}

/// Retrieves the full state of an import job.
///
/// Uses `GET /api/imports/{job}`. Besides status and counters the response
/// carries the id of the playlist created on the target provider (once there
/// is one) and the tracks the matcher found nothing for.
///
/// # Errors
///
/// - `NotFound` if the backend does not know the job
/// - `Network` / `Decode` for transport and payload problems
pub async fn fetch_job(backend: &HttpBackend, job_id: JobId) -> Result<JobDetails, ApiError> {
    let id = job_id.to_string();
    let response = backend.get(&["imports", &id]).send().await?;
    let response = check_status(response, &format!("job {}", job_id)).await?;
    decode::<JobDetails>(response).await
}

/// Retrieves aggregate counters of a job.
///
/// This is the polling endpoint; it is read-only and safe to call repeatedly.
pub async fn fetch_job_stats(backend: &HttpBackend, job_id: JobId) -> Result<JobStats, ApiError> {
    let id = job_id.to_string();
    let response = backend.get(&["imports", &id, "stats"]).send().await?;
    let response = check_status(response, &format!("job {}", job_id)).await?;
    decode::<JobStats>(response).await
}

/// Moves a job from review into the import phase.
///
/// The backend enqueues the playlist build and answers immediately; progress
/// is observed by polling [`fetch_job_stats`].
pub async fn finalize_job(backend: &HttpBackend, job_id: JobId) -> Result<(), ApiError> {
    let id = job_id.to_string();
    let response = backend.post(&["imports", &id, "finalize"]).send().await?;
    check_status(response, &format!("job {}", job_id)).await?;
    Ok(())
}
