//! # Backend Integration Module
//!
//! Everything that decides *what* a track matches lives in the migration
//! backend. This module describes the operations the client consumes from it
//! as the [`ReviewBackend`] trait and implements them over HTTP in
//! [`HttpBackend`].
//!
//! ## Architecture
//!
//! ```text
//! CLI / Review Engine
//!          ↓
//! ReviewBackend (capability trait)
//!     ├── Playlists (source playlists, start an import)
//!     ├── Jobs      (overview, details, stats, finalize)
//!     ├── Review    (items awaiting review, decision batches)
//!     └── Search    (retry search, add track to playlist)
//!          ↓
//! HttpBackend (reqwest, JSON)
//!          ↓
//! Migration backend
//! ```
//!
//! The review engine is generic over the trait, which keeps it testable
//! against an in-memory double.
//!
//! ## Error Mapping
//!
//! Every response goes through [`check_status`]:
//!
//! | Status | Error |
//! |---|---|
//! | 2xx | none |
//! | 404 | [`ApiError::NotFound`] |
//! | 400, 409, 422 | [`ApiError::Validation`] with the response body |
//! | anything else | [`ApiError::Server`] |
//!
//! Transport failures surface as [`ApiError::Network`], unreadable bodies as
//! [`ApiError::Decode`]. Ids coming from the user or the backend are pushed as
//! escaped path segments, never spliced into the URL as text. Nothing here retries on its own; every retry is
//! started by the user.

pub mod jobs;
pub mod playlists;
pub mod review;
pub mod search;

use std::{future::Future, time::Duration};

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    config,
    error::ApiError,
    types::{
        DecisionEntry, JobDetails, JobId, JobStats, JobSummary, Provider, ReviewItem,
        SearchFilter, SourcePlaylist, Suggestion,
    },
};

/// Operations the review client consumes from the migration backend.
pub trait ReviewBackend {
    /// Playlists of the connected source account.
    fn list_playlists(&self) -> impl Future<Output = Result<Vec<SourcePlaylist>, ApiError>> + Send;

    /// Queues one import job per playlist id and returns the new job ids.
    ///
    /// Fails with `Validation` if the target provider is not connected.
    fn create_import(
        &self,
        playlist_ids: &[String],
        target: Provider,
    ) -> impl Future<Output = Result<Vec<JobId>, ApiError>> + Send;

    /// All jobs of the user, newest first.
    fn list_jobs(&self) -> impl Future<Output = Result<Vec<JobSummary>, ApiError>> + Send;

    /// Full job state including stats and tracks that found no match.
    fn fetch_job(&self, job_id: JobId)
    -> impl Future<Output = Result<JobDetails, ApiError>> + Send;

    /// Items awaiting a human decision. Empty when nothing is pending review.
    fn fetch_review_items(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<Vec<ReviewItem>, ApiError>> + Send;

    /// Sends one batch of decisions. Fails with `Validation` if an item id is
    /// unknown to the job.
    fn submit_decisions(
        &self,
        job_id: JobId,
        decisions: &[DecisionEntry],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Asks the backend to build the target playlist from confirmed matches.
    fn finalize_job(&self, job_id: JobId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Aggregate counters. Safe to call repeatedly.
    fn fetch_job_stats(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<JobStats, ApiError>> + Send;

    /// Second-chance catalog search. An empty list is a valid answer.
    fn retry_search(
        &self,
        query: &str,
        filter: SearchFilter,
        top_k: u32,
    ) -> impl Future<Output = Result<Vec<Suggestion>, ApiError>> + Send;

    /// Appends a suggestion to a playlist on the target provider.
    fn add_track_to_playlist(
        &self,
        playlist_id: &str,
        suggestion_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// [`ReviewBackend`] implementation talking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    /// Fails with `InvalidUrl` unless `base_url` is an absolute http(s) URL.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: parsed,
            token,
        })
    }

    /// Builds a client from `PLMCLI_BACKEND_URL` and `PLMCLI_API_TOKEN`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(&config::backend_url(), config::api_token())
    }

    /// `{base}/api/{segments...}` with every segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) fn get(&self, segments: &[&str]) -> RequestBuilder {
        self.authorize(self.client.get(self.url(segments)))
    }

    pub(crate) fn post(&self, segments: &[&str]) -> RequestBuilder {
        self.authorize(self.client.post(self.url(segments)))
    }
}

impl ReviewBackend for HttpBackend {
    async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, ApiError> {
        playlists::list_playlists(self).await
    }

    async fn create_import(
        &self,
        playlist_ids: &[String],
        target: Provider,
    ) -> Result<Vec<JobId>, ApiError> {
        playlists::create_import(self, playlist_ids, target).await
    }

    async fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        jobs::list_jobs(self).await
    }

    async fn fetch_job(&self, job_id: JobId) -> Result<JobDetails, ApiError> {
        jobs::fetch_job(self, job_id).await
    }

    async fn fetch_review_items(&self, job_id: JobId) -> Result<Vec<ReviewItem>, ApiError> {
        review::fetch_review_items(self, job_id).await
    }

    async fn submit_decisions(
        &self,
        job_id: JobId,
        decisions: &[DecisionEntry],
    ) -> Result<(), ApiError> {
        review::submit_decisions(self, job_id, decisions).await
    }

    async fn finalize_job(&self, job_id: JobId) -> Result<(), ApiError> {
        jobs::finalize_job(self, job_id).await
    }

    async fn fetch_job_stats(&self, job_id: JobId) -> Result<JobStats, ApiError> {
        jobs::fetch_job_stats(self, job_id).await
    }

    async fn retry_search(
        &self,
        query: &str,
        filter: SearchFilter,
        top_k: u32,
    ) -> Result<Vec<Suggestion>, ApiError> {
        search::retry_search(self, query, filter, top_k).await
    }

    async fn add_track_to_playlist(
        &self,
        playlist_id: &str,
        suggestion_id: &str,
    ) -> Result<(), ApiError> {
        search::add_track_to_playlist(self, playlist_id, suggestion_id).await
    }
}

/// Maps a non-success status onto the error taxonomy.
///
/// `resource` names what was requested and ends up in `NotFound` messages.
pub(crate) async fn check_status(response: Response, resource: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(resource.to_string())),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ApiError::Validation(body))
        }
        other => Err(ApiError::Server {
            status: other.as_u16(),
            body,
        }),
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e)
        }
    })
}
