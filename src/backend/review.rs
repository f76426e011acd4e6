use crate::{
    backend::{HttpBackend, check_status, decode},
    error::ApiError,
    types::{DecisionEntry, JobId, ReviewItem, ReviewItemsResponse, SubmitDecisionsRequest},
};

/// Retrieves the uncertain matches of a job that wait for a human decision.
///
/// Returns an empty list when nothing is pending review.
pub async fn fetch_review_items(
    backend: &HttpBackend,
    job_id: JobId,
) -> Result<Vec<ReviewItem>, ApiError> {
    let id = job_id.to_string();
    let response = backend.get(&["imports", &id, "review"]).send().await?;
    let response = check_status(response, &format!("job {}", job_id)).await?;
    let json = decode::<ReviewItemsResponse>(response).await?;
    Ok(json.items)
}

/// Sends a batch of review decisions.
///
/// Exactly one request is made per call. The backend answers with a
/// validation error when an item id does not belong to the job; nothing is
/// retried here.
pub async fn submit_decisions(
    backend: &HttpBackend,
    job_id: JobId,
    decisions: &[DecisionEntry],
) -> Result<(), ApiError> {
    let body = SubmitDecisionsRequest {
        decisions: decisions.to_vec(),
    };

    let id = job_id.to_string();
    let response = backend
        .post(&["imports", &id, "review"])
        .json(&body)
        .send()
        .await?;
    check_status(response, &format!("job {}", job_id)).await?;
    Ok(())
}
