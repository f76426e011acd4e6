#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use plmcli::{
    backend::ReviewBackend,
    error::ApiError,
    types::{
        DecisionEntry, ItemId, JobDetails, JobId, JobStats, JobStatus, JobSummary, MissedTrack,
        OriginalTrack, Provider, ReviewItem, SearchFilter, SourcePlaylist, SuggestedMatch,
        Suggestion,
    },
};

#[derive(Default)]
pub struct FakeState {
    pub playlists: Vec<SourcePlaylist>,
    pub jobs: Vec<JobSummary>,
    pub created: Vec<(Vec<String>, Provider)>,
    pub details: Option<JobDetails>,
    pub items: Vec<ReviewItem>,
    pub stats: JobStats,
    pub search_results: HashMap<String, Vec<Suggestion>>,
    pub failing_queries: Vec<String>,
    pub search_calls: Vec<(String, SearchFilter, u32)>,
    pub submitted: Vec<(JobId, Vec<DecisionEntry>)>,
    pub submit_fails: bool,
    pub added: Vec<(String, String)>,
    pub add_fails: bool,
}

/// In-memory backend double recording every call.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn with_results(query: &str, results: Vec<Suggestion>) -> Self {
        let backend = FakeBackend::default();
        backend.add_results(query, results);
        backend
    }

    pub fn add_results(&self, query: &str, results: Vec<Suggestion>) {
        self.state
            .lock()
            .unwrap()
            .search_results
            .insert(query.to_string(), results);
    }

    pub fn fail_query(&self, query: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_queries
            .push(query.to_string());
    }

    pub fn search_calls(&self) -> Vec<(String, SearchFilter, u32)> {
        self.state.lock().unwrap().search_calls.clone()
    }

    pub fn submitted(&self) -> Vec<(JobId, Vec<DecisionEntry>)> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn added(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().added.clone()
    }

    pub fn created(&self) -> Vec<(Vec<String>, Provider)> {
        self.state.lock().unwrap().created.clone()
    }
}

impl ReviewBackend for FakeBackend {
    async fn list_playlists(&self) -> Result<Vec<SourcePlaylist>, ApiError> {
        Ok(self.state.lock().unwrap().playlists.clone())
    }

    async fn create_import(
        &self,
        playlist_ids: &[String],
        target: Provider,
    ) -> Result<Vec<JobId>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.created.push((playlist_ids.to_vec(), target));
        let first = 100 + state.jobs.len() as u64;
        Ok((0..playlist_ids.len() as u64).map(|i| JobId(first + i)).collect())
    }

    async fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        Ok(self.state.lock().unwrap().jobs.clone())
    }

    async fn fetch_job(&self, job_id: JobId) -> Result<JobDetails, ApiError> {
        self.state
            .lock()
            .unwrap()
            .details
            .clone()
            .ok_or_else(|| ApiError::NotFound(format!("job {}", job_id)))
    }

    async fn fetch_review_items(&self, _job_id: JobId) -> Result<Vec<ReviewItem>, ApiError> {
        Ok(self.state.lock().unwrap().items.clone())
    }

    async fn submit_decisions(
        &self,
        job_id: JobId,
        decisions: &[DecisionEntry],
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push((job_id, decisions.to_vec()));
        if state.submit_fails {
            return Err(ApiError::Server {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn finalize_job(&self, _job_id: JobId) -> Result<(), ApiError> {
        Ok(())
    }

    async fn fetch_job_stats(&self, _job_id: JobId) -> Result<JobStats, ApiError> {
        Ok(self.state.lock().unwrap().stats)
    }

    async fn retry_search(
        &self,
        query: &str,
        filter: SearchFilter,
        top_k: u32,
    ) -> Result<Vec<Suggestion>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.search_calls.push((query.to_string(), filter, top_k));
        if state.failing_queries.iter().any(|q| q == query) {
            return Err(ApiError::Server {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(state.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn add_track_to_playlist(
        &self,
        playlist_id: &str,
        suggestion_id: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.add_fails {
            return Err(ApiError::NotFound(format!("playlist {}", playlist_id)));
        }
        state
            .added
            .push((playlist_id.to_string(), suggestion_id.to_string()));
        Ok(())
    }
}

pub fn track(name: &str, artists: &[&str]) -> OriginalTrack {
    OriginalTrack {
        name: name.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        duration_ms: 215_000,
    }
}

pub fn review_item(id: u64, name: &str, score: f64) -> ReviewItem {
    ReviewItem {
        id: ItemId(id),
        original_track: track(name, &["Massive Attack"]),
        suggested_match: Some(SuggestedMatch {
            id: Some(format!("match-{}", id)),
            title: name.to_string(),
            artists: vec!["Massive Attack".to_string()],
            duration_seconds: Some(215),
            match_score: score,
        }),
    }
}

pub fn suggestion(id: &str, title: &str) -> Suggestion {
    Suggestion {
        id: id.to_string(),
        title: title.to_string(),
        artists: vec!["Massive Attack".to_string()],
        album: Some("Mezzanine".to_string()),
        duration_seconds: Some(331),
    }
}

pub fn missed(id: u64, name: &str) -> MissedTrack {
    MissedTrack {
        id: ItemId(id),
        original_track: track(name, &["Massive Attack"]),
    }
}

pub fn job_details(target_playlist_id: Option<&str>, missed: Vec<MissedTrack>) -> JobDetails {
    JobDetails {
        id: JobId(42),
        status: JobStatus::WaitingReview,
        source_playlist_id: "37i9dQZF1DXcBWIGoYBM5M".to_string(),
        source_playlist_name: Some("Road Trip".to_string()),
        target_provider: Provider::Tidal,
        target_playlist_id: target_playlist_id.map(str::to_string),
        created_at: None,
        error_message: None,
        stats: JobStats {
            total: 10,
            matched: 7,
            uncertain: 2,
            failed: 1,
        },
        missed,
    }
}

pub fn job_summary(id: u64, status: JobStatus, created_at: Option<&str>) -> JobSummary {
    JobSummary {
        id: JobId(id),
        source_playlist_id: format!("playlist-{}", id),
        source_playlist_name: None,
        status,
        target_provider: Provider::Tidal,
        total_items: 10,
        matched_items: 7,
        created_at: created_at.and_then(|at| at.parse().ok()),
    }
}
