use crate::{
    review::{DecisionStore, RetryBook},
    types::{
        JobSummary, JobTableRow, MissedTableRow, OriginalTrack, PlaylistTableRow, Provider,
        ReviewItem, ReviewTableRow, SearchFilter, SourcePlaylist, Suggestion, SuggestionTableRow,
    },
};

/// Default query for a retry search: track name followed by every artist.
pub fn build_search_query(track: &OriginalTrack) -> String {
    std::iter::once(track.name.trim())
        .chain(track.artists.iter().map(|a| a.trim()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_search_filter(s: &str) -> Result<SearchFilter, String> {
    match s.trim().to_lowercase().as_str() {
        "songs" | "song" => Ok(SearchFilter::Songs),
        "videos" | "video" => Ok(SearchFilter::Videos),
        "uploads" | "upload" => Ok(SearchFilter::Uploads),
        other => Err(format!(
            "invalid search filter '{}', expected one of: songs, videos, uploads",
            other
        )),
    }
}

pub fn parse_provider(s: &str) -> Result<Provider, String> {
    match s.trim().to_lowercase().as_str() {
        "spotify" => Ok(Provider::Spotify),
        "tidal" => Ok(Provider::Tidal),
        "ytm" | "youtube" | "youtube-music" => Ok(Provider::Ytm),
        "qobuz" => Ok(Provider::Qobuz),
        other => Err(format!(
            "invalid provider '{}', expected one of: spotify, tidal, ytm, qobuz",
            other
        )),
    }
}

/// Trims playlist ids and drops blanks and repeats, keeping the first
/// occurrence of each.
pub fn normalize_playlist_ids(ids: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        if !normalized.iter().any(|known| known == id) {
            normalized.push(id.to_string());
        }
    }
    normalized
}

pub fn format_duration_secs(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `0` means the duration is unknown and renders as `-`.
pub fn format_duration_ms(ms: u64) -> String {
    if ms == 0 {
        return "-".to_string();
    }
    format_duration_secs((ms + 500) / 1000)
}

pub fn format_score(score: f64) -> String {
    format!("{:.0}%", score.clamp(0.0, 1.0) * 100.0)
}

pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share)
}

/// Label of the submit affordance, e.g. "Submit 2 Decisions".
pub fn submit_label(count: usize) -> String {
    if count == 1 {
        "Submit 1 Decision".to_string()
    } else {
        format!("Submit {} Decisions", count)
    }
}

fn describe_track(name: &str, artists: &[String]) -> String {
    if artists.is_empty() {
        name.to_string()
    } else {
        format!("{} - {}", name, artists.join(", "))
    }
}

pub fn review_rows(items: &[ReviewItem], decisions: &DecisionStore) -> Vec<ReviewTableRow> {
    items
        .iter()
        .map(|item| {
            let (suggestion, suggested_length, score) = match &item.suggested_match {
                Some(m) => (
                    describe_track(&m.title, &m.artists),
                    m.duration_seconds
                        .map(format_duration_secs)
                        .unwrap_or_else(|| "-".to_string()),
                    format_score(m.match_score),
                ),
                None => ("no suggestion".to_string(), "-".to_string(), "-".to_string()),
            };

            ReviewTableRow {
                id: item.id.to_string(),
                track: describe_track(&item.original_track.name, &item.original_track.artists),
                length: format_duration_ms(item.original_track.duration_ms),
                suggestion,
                suggested_length,
                score,
                decision: decisions
                    .decision(item.id)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

pub fn suggestion_rows(suggestions: &[Suggestion]) -> Vec<SuggestionTableRow> {
    suggestions
        .iter()
        .map(|s| SuggestionTableRow {
            id: s.id.clone(),
            title: s.title.clone(),
            artists: s.artists.join(", "),
            album: s.album.clone().unwrap_or_else(|| "-".to_string()),
            duration: s
                .duration_seconds
                .map(format_duration_secs)
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

pub fn missed_rows(book: &RetryBook) -> Vec<MissedTableRow> {
    book.states()
        .map(|state| MissedTableRow {
            id: state.item_id().to_string(),
            query: state.edited_query().to_string(),
            suggestions: state.suggestions().len().to_string(),
            status: match state.last_error() {
                Some(err) => format!("{} ({})", state.status(), err),
                None => state.status().to_string(),
            },
        })
        .collect()
}

pub fn playlist_rows(playlists: &[SourcePlaylist]) -> Vec<PlaylistTableRow> {
    playlists
        .iter()
        .map(|p| PlaylistTableRow {
            id: p.id.clone(),
            name: p.name.clone(),
            tracks: p.tracks,
        })
        .collect()
}

pub fn job_rows(jobs: &[JobSummary]) -> Vec<JobTableRow> {
    jobs.iter()
        .map(|job| JobTableRow {
            id: job.id.to_string(),
            source: job.source().to_string(),
            target: job.target_provider.to_string(),
            status: job.status.to_string(),
            items: format!("{}/{}", job.matched_items, job.total_items),
            match_rate: format_share(job.match_rate()),
            created: job
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}
