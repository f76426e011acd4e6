use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(JobId)
    }
}

/// Identifier of one imported track, assigned by the backend job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ItemId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub duration_ms: u64,
}

/// Best candidate the backend matcher found for an [`OriginalTrack`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedMatch {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default, alias = "duration")]
    pub duration_seconds: Option<u64>,
    /// Matcher confidence in `[0, 1]`.
    #[serde(alias = "_score")]
    pub match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: ItemId,
    pub original_track: OriginalTrack,
    #[serde(default)]
    pub suggested_match: Option<SuggestedMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItemsResponse {
    pub items: Vec<ReviewItem>,
}

/// A user's verdict on a [`ReviewItem`]. An item without a decision is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Confirm,
    Reject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Confirm => write!(f, "confirm"),
            Decision::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub item_id: ItemId,
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitDecisionsRequest {
    pub decisions: Vec<DecisionEntry>,
}

/// Narrows the catalog scope of a retry search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    #[default]
    Songs,
    Videos,
    Uploads,
}

impl SearchFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchFilter::Songs => "songs",
            SearchFilter::Videos => "videos",
            SearchFilter::Uploads => "uploads",
        }
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Candidate track returned by a retry search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default, alias = "duration")]
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackRequest {
    pub suggestion_id: String,
}

/// Aggregate item counters of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobStats {
    pub total: u32,
    pub matched: u32,
    pub uncertain: u32,
    pub failed: u32,
}

impl JobStats {
    /// Items the matcher has settled so far, in any outcome.
    pub fn processed(&self) -> u64 {
        self.matched as u64 + self.uncertain as u64 + self.failed as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    WaitingReview,
    Importing,
    Done,
    Failed,
}

impl JobStatus {
    /// Whether the backend is still working on the job on its own.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::Queued | JobStatus::Running | JobStatus::Importing
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::WaitingReview => "waiting review",
            JobStatus::Importing => "importing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Spotify,
    Tidal,
    Ytm,
    Qobuz,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Spotify => "Spotify",
            Provider::Tidal => "Tidal",
            Provider::Ytm => "YouTube Music",
            Provider::Qobuz => "Qobuz",
        };
        write!(f, "{}", name)
    }
}

/// Playlist on the source provider that can be imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<SourcePlaylist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateImportRequest {
    pub playlist_ids: Vec<String>,
    pub target_provider: Provider,
}

/// Ids of the jobs the backend queued, one per source playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImportResponse {
    #[serde(default)]
    pub jobs: Vec<JobId>,
}

/// One job in the overview of all jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub source_playlist_id: String,
    #[serde(default)]
    pub source_playlist_name: Option<String>,
    pub status: JobStatus,
    pub target_provider: Provider,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub matched_items: u32,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl JobSummary {
    /// Playlist name when known, otherwise its id.
    pub fn source(&self) -> &str {
        match self.source_playlist_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.source_playlist_id,
        }
    }

    /// Matched items in percent of all items, rounded to one decimal.
    pub fn match_rate(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        (self.matched_items as f64 * 1000.0 / self.total_items as f64).round() / 10.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<JobSummary>,
}

/// A retry that ended with a suggestion added to the target playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledRetry {
    pub item_id: ItemId,
    pub selected: Suggestion,
}

/// Track the backend could not match at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedTrack {
    pub id: ItemId,
    pub original_track: OriginalTrack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    pub id: JobId,
    pub status: JobStatus,
    pub source_playlist_id: String,
    #[serde(default)]
    pub source_playlist_name: Option<String>,
    pub target_provider: Provider,
    /// Playlist created on the target provider, once the job produced one.
    #[serde(default)]
    pub target_playlist_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub stats: JobStats,
    #[serde(default)]
    pub missed: Vec<MissedTrack>,
}

#[derive(Tabled)]
pub struct ReviewTableRow {
    pub id: String,
    pub track: String,
    pub length: String,
    pub suggestion: String,
    #[tabled(rename = "suggested length")]
    pub suggested_length: String,
    pub score: String,
    pub decision: String,
}

#[derive(Tabled)]
pub struct SuggestionTableRow {
    pub id: String,
    pub title: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}

#[derive(Tabled)]
pub struct MissedTableRow {
    pub id: String,
    pub query: String,
    pub suggestions: String,
    pub status: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub tracks: u32,
}

#[derive(Tabled)]
pub struct JobTableRow {
    pub id: String,
    pub source: String,
    pub target: String,
    pub status: String,
    pub items: String,
    #[tabled(rename = "match rate")]
    pub match_rate: String,
    pub created: String,
}
