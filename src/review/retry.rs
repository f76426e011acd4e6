//! Second-chance search for tracks the backend matcher missed.
//!
//! Each missed track gets a [`RetryState`], a small state machine:
//!
//! ```text
//!            search()                 results
//! Pending ─────────────▶ Retrying ─────────────▶ Pending (suggestions filled)
//!    ▲                     │  │
//!    │ edit query          │  └── empty / error ──▶ Failed ──search()──▶ Retrying
//!    └─────────────────────┼───────────────────────────┘
//!                          │
//! Pending ──add(suggestion)──▶ Retrying ── ok ──▶ Success (terminal)
//!                                      └─ error ─▶ Failed
//! ```
//!
//! Network calls are split into `begin_*` and `complete_*` so the state is
//! never borrowed across an await point. This lets retries for different
//! items be outstanding at the same time while each item has at most one call
//! in flight.

use std::{collections::BTreeMap, fmt};

use crate::{
    backend::ReviewBackend,
    error::{ApiError, RetryError},
    types::{ItemId, MissedTrack, SearchFilter, SettledRetry, Suggestion},
    utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStatus {
    /// Awaiting user action: a first search, or picking one of the suggestions.
    Pending,
    /// A network call for this item is outstanding.
    Retrying,
    Success,
    Failed,
}

impl fmt::Display for RetryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RetryStatus::Pending => "pending",
            RetryStatus::Retrying => "retrying",
            RetryStatus::Success => "success",
            RetryStatus::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum InFlight {
    Search { attempt: u64 },
    Add { attempt: u64, suggestion_id: String },
}

/// An outstanding retry search, returned by [`RetryState::begin_search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub item_id: ItemId,
    pub query: String,
    pub filter: SearchFilter,
    attempt: u64,
}

/// An outstanding add-to-playlist call, returned by [`RetryState::begin_add`].
#[derive(Debug, Clone, PartialEq)]
pub struct AddRequest {
    pub item_id: ItemId,
    pub playlist_id: String,
    pub suggestion_id: String,
    attempt: u64,
}

#[derive(Debug, Clone)]
pub struct RetryState {
    item_id: ItemId,
    original_query: String,
    edited_query: String,
    filter: SearchFilter,
    status: RetryStatus,
    suggestions: Vec<Suggestion>,
    selected: Option<Suggestion>,
    last_error: Option<String>,
    attempts: u64,
    in_flight: Option<InFlight>,
}

impl RetryState {
    pub fn new(item_id: ItemId, query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            item_id,
            edited_query: query.clone(),
            original_query: query,
            filter: SearchFilter::default(),
            status: RetryStatus::Pending,
            suggestions: Vec::new(),
            selected: None,
            last_error: None,
            attempts: 0,
            in_flight: None,
        }
    }

    pub fn for_missed(track: &MissedTrack) -> Self {
        Self::new(track.id, utils::build_search_query(&track.original_track))
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn original_query(&self) -> &str {
        &self.original_query
    }

    pub fn edited_query(&self) -> &str {
        &self.edited_query
    }

    pub fn filter(&self) -> SearchFilter {
        self.filter
    }

    pub fn status(&self) -> RetryStatus {
        self.status
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Suggestion that was added to the playlist, once the item succeeded.
    pub fn selected(&self) -> Option<&Suggestion> {
        self.selected.as_ref()
    }

    /// Message to show next to the item after a failed attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Puts an item that succeeded in an earlier session back into `Success`.
    pub fn restore_success(&mut self, selected: Suggestion) {
        self.status = RetryStatus::Success;
        self.in_flight = None;
        self.last_error = None;
        self.suggestions = vec![selected.clone()];
        self.selected = Some(selected);
    }

    pub fn edit_query(&mut self, query: impl Into<String>) -> Result<(), RetryError> {
        self.unlock_for_edit()?;
        self.edited_query = query.into();
        Ok(())
    }

    pub fn set_filter(&mut self, filter: SearchFilter) -> Result<(), RetryError> {
        self.unlock_for_edit()?;
        self.filter = filter;
        Ok(())
    }

    // Editing clears a failure so the item can be searched again.
    fn unlock_for_edit(&mut self) -> Result<(), RetryError> {
        match self.status {
            RetryStatus::Retrying | RetryStatus::Success => Err(RetryError::QueryLocked(self.status)),
            RetryStatus::Failed => {
                self.status = RetryStatus::Pending;
                self.last_error = None;
                Ok(())
            }
            RetryStatus::Pending => Ok(()),
        }
    }

    /// Moves the item to `Retrying` and returns the search to run.
    ///
    /// Returns `None` without touching the state when the item is already
    /// retrying or has succeeded.
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        if !matches!(self.status, RetryStatus::Pending | RetryStatus::Failed) {
            return None;
        }

        self.attempts += 1;
        self.status = RetryStatus::Retrying;
        self.last_error = None;
        self.in_flight = Some(InFlight::Search {
            attempt: self.attempts,
        });

        Some(SearchRequest {
            item_id: self.item_id,
            query: self.edited_query.clone(),
            filter: self.filter,
            attempt: self.attempts,
        })
    }

    /// Settles a search started with [`begin_search`](Self::begin_search).
    ///
    /// Non-empty results return the item to `Pending` with the suggestions
    /// attached; an empty list or an error moves it to `Failed`. A result that
    /// does not belong to the outstanding call is discarded.
    pub fn complete_search(
        &mut self,
        request: &SearchRequest,
        result: Result<Vec<Suggestion>, ApiError>,
    ) -> RetryStatus {
        let expected = InFlight::Search {
            attempt: request.attempt,
        };
        if self.in_flight.as_ref() != Some(&expected) {
            return self.status;
        }
        self.in_flight = None;

        match result {
            Ok(results) if !results.is_empty() => {
                self.suggestions = results;
                self.status = RetryStatus::Pending;
            }
            Ok(_) => {
                self.suggestions.clear();
                self.last_error = Some("No matches found".to_string());
                self.status = RetryStatus::Failed;
            }
            Err(e) => {
                self.suggestions.clear();
                self.last_error = Some(e.to_string());
                self.status = RetryStatus::Failed;
            }
        }

        self.status
    }

    /// Starts attaching one of the offered suggestions to the target playlist.
    ///
    /// `playlist_id` is the playlist the job created on the target provider.
    /// Without one the call is refused before any state changes.
    pub fn begin_add(
        &mut self,
        suggestion_id: &str,
        playlist_id: Option<&str>,
    ) -> Result<AddRequest, RetryError> {
        let playlist_id = playlist_id.ok_or(RetryError::MissingPlaylist)?;
        if self.status != RetryStatus::Pending {
            return Err(RetryError::NotAwaitingSelection(self.status));
        }
        if !self.suggestions.iter().any(|s| s.id == suggestion_id) {
            return Err(RetryError::UnknownSuggestion(suggestion_id.to_string()));
        }

        self.attempts += 1;
        self.status = RetryStatus::Retrying;
        self.last_error = None;
        self.in_flight = Some(InFlight::Add {
            attempt: self.attempts,
            suggestion_id: suggestion_id.to_string(),
        });

        Ok(AddRequest {
            item_id: self.item_id,
            playlist_id: playlist_id.to_string(),
            suggestion_id: suggestion_id.to_string(),
            attempt: self.attempts,
        })
    }

    /// Settles an add started with [`begin_add`](Self::begin_add).
    pub fn complete_add(&mut self, request: &AddRequest, result: Result<(), ApiError>) -> RetryStatus {
        let expected = InFlight::Add {
            attempt: request.attempt,
            suggestion_id: request.suggestion_id.clone(),
        };
        if self.in_flight.as_ref() != Some(&expected) {
            return self.status;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                self.selected = self
                    .suggestions
                    .iter()
                    .find(|s| s.id == request.suggestion_id)
                    .cloned();
                self.status = RetryStatus::Success;
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.status = RetryStatus::Failed;
            }
        }

        self.status
    }
}

/// Retry states of all missed tracks of one job, keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct RetryBook {
    states: BTreeMap<ItemId, RetryState>,
}

impl RetryBook {
    pub fn new(missed: &[MissedTrack]) -> Self {
        Self {
            states: missed
                .iter()
                .map(|track| (track.id, RetryState::for_missed(track)))
                .collect(),
        }
    }

    /// Marks items settled in an earlier session as succeeded.
    ///
    /// Entries for items the book does not track are skipped. Returns how
    /// many were applied.
    pub fn restore(&mut self, settled: &[SettledRetry]) -> usize {
        let mut applied = 0;
        for entry in settled {
            if let Some(state) = self.states.get_mut(&entry.item_id) {
                state.restore_success(entry.selected.clone());
                applied += 1;
            }
        }
        applied
    }

    /// Items whose pick was added to the target playlist.
    pub fn settled(&self) -> Vec<SettledRetry> {
        self.states
            .values()
            .filter(|state| state.status == RetryStatus::Success)
            .filter_map(|state| {
                state.selected.clone().map(|selected| SettledRetry {
                    item_id: state.item_id,
                    selected,
                })
            })
            .collect()
    }

    pub fn get(&self, item_id: ItemId) -> Option<&RetryState> {
        self.states.get(&item_id)
    }

    pub fn states(&self) -> impl Iterator<Item = &RetryState> {
        self.states.values()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn state_mut(&mut self, item_id: ItemId) -> Result<&mut RetryState, RetryError> {
        self.states
            .get_mut(&item_id)
            .ok_or(RetryError::UnknownItem(item_id))
    }

    pub fn edit_query(&mut self, item_id: ItemId, query: impl Into<String>) -> Result<(), RetryError> {
        self.state_mut(item_id)?.edit_query(query)
    }

    pub fn set_filter(&mut self, item_id: ItemId, filter: SearchFilter) -> Result<(), RetryError> {
        self.state_mut(item_id)?.set_filter(filter)
    }

    pub fn begin_search(&mut self, item_id: ItemId) -> Result<Option<SearchRequest>, RetryError> {
        Ok(self.state_mut(item_id)?.begin_search())
    }

    /// Returns `None` when the item is no longer tracked, the result is dropped.
    pub fn complete_search(
        &mut self,
        request: &SearchRequest,
        result: Result<Vec<Suggestion>, ApiError>,
    ) -> Option<RetryStatus> {
        self.states
            .get_mut(&request.item_id)
            .map(|state| state.complete_search(request, result))
    }

    pub fn begin_add(
        &mut self,
        item_id: ItemId,
        suggestion_id: &str,
        playlist_id: Option<&str>,
    ) -> Result<AddRequest, RetryError> {
        self.state_mut(item_id)?.begin_add(suggestion_id, playlist_id)
    }

    pub fn complete_add(
        &mut self,
        request: &AddRequest,
        result: Result<(), ApiError>,
    ) -> Option<RetryStatus> {
        self.states
            .get_mut(&request.item_id)
            .map(|state| state.complete_add(request, result))
    }

    /// Runs one retry search for `item_id` and settles it.
    ///
    /// A request for an item that is already retrying or succeeded is ignored
    /// and the current status is returned.
    pub async fn search<B: ReviewBackend>(
        &mut self,
        item_id: ItemId,
        backend: &B,
        top_k: u32,
    ) -> Result<RetryStatus, RetryError> {
        let Some(request) = self.begin_search(item_id)? else {
            return Ok(self.state_mut(item_id)?.status());
        };

        let result = backend
            .retry_search(&request.query, request.filter, top_k)
            .await;
        self.complete_search(&request, result)
            .ok_or(RetryError::UnknownItem(item_id))
    }

    /// Adds an offered suggestion to `playlist_id` and settles the item.
    pub async fn add_suggestion<B: ReviewBackend>(
        &mut self,
        item_id: ItemId,
        suggestion_id: &str,
        playlist_id: Option<&str>,
        backend: &B,
    ) -> Result<RetryStatus, RetryError> {
        let request = self.begin_add(item_id, suggestion_id, playlist_id)?;
        let result = backend
            .add_track_to_playlist(&request.playlist_id, &request.suggestion_id)
            .await;
        self.complete_add(&request, result)
            .ok_or(RetryError::UnknownItem(item_id))
    }

    /// Starts a retry search for every eligible item at once and settles them.
    ///
    /// Items that are retrying or succeeded are skipped. Each search runs in
    /// its own task; a failing one only marks its own item as failed.
    pub async fn search_all<B>(&mut self, backend: &B, top_k: u32) -> Vec<(ItemId, RetryStatus)>
    where
        B: ReviewBackend + Clone + Send + Sync + 'static,
    {
        let item_ids: Vec<ItemId> = self.states.keys().copied().collect();
        let mut handles = Vec::new();

        for item_id in item_ids {
            let Ok(Some(request)) = self.begin_search(item_id) else {
                continue;
            };

            let backend = backend.clone();
            let query = request.query.clone();
            let filter = request.filter;
            let handle =
                tokio::spawn(async move { backend.retry_search(&query, filter, top_k).await });
            handles.push((request, handle));
        }

        let mut outcome = Vec::new();
        for (request, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ApiError::Interrupted(e.to_string())),
            };
            if let Some(status) = self.complete_search(&request, result) {
                outcome.push((request.item_id, status));
            }
        }

        outcome
    }
}
