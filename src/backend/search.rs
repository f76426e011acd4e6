use crate::{
    backend::{HttpBackend, check_status, decode},
    error::ApiError,
    types::{AddTrackRequest, SearchFilter, SearchResponse, Suggestion},
};

/// Runs a second-chance catalog search for a track the matcher missed.
///
/// Uses `GET /api/search` with the query parameters `q`, `filter` and `top_k`.
/// The backend answers `{"results": []}` when nothing matches, which is
/// returned as an empty list rather than an error.
///
/// # Example
///
/// ```
/// let suggestions = retry_search(&backend, "Teardrop Massive Attack", SearchFilter::Songs, 5).await?;
/// for s in suggestions {
///     println!("{} - {}", s.title, s.artists.join(", "));
/// }
/// ```
pub async fn retry_search(
    backend: &HttpBackend,
    query: &str,
    filter: SearchFilter,
    top_k: u32,
) -> Result<Vec<Suggestion>, ApiError> {
    let top_k = top_k.to_string();
    let response = backend
        .get(&["search"])
        .query(&[("q", query), ("filter", filter.as_str()), ("top_k", top_k.as_str())])
        .send()
        .await?;
    let response = check_status(response, "search").await?;
    let json = decode::<SearchResponse>(response).await?;
    Ok(json.results)
}

/// Appends one suggestion to a playlist on the target provider.
///
/// Uses `POST /api/playlists/{playlist}/tracks`; the id is sent as one escaped
/// path segment. Fails with `NotFound` when the playlist id is stale or
/// unknown.
pub async fn add_track_to_playlist(
    backend: &HttpBackend,
    playlist_id: &str,
    suggestion_id: &str,
) -> Result<(), ApiError> {
    let body = AddTrackRequest {
        suggestion_id: suggestion_id.to_string(),
    };

    let response = backend
        .post(&["playlists", playlist_id, "tracks"])
        .json(&body)
        .send()
        .await?;
    check_status(response, &format!("playlist {}", playlist_id)).await?;
    Ok(())
}
