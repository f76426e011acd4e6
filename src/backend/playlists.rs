use crate::{
    backend::{HttpBackend, check_status, decode},
    error::ApiError,
    types::{
        CreateImportRequest, CreateImportResponse, JobId, PlaylistsResponse, Provider,
        SourcePlaylist,
    },
};

/// Retrieves the playlists of the connected source account.
///
/// Uses `GET /api/playlists`. Fails with `Validation` when no source account
/// is connected.
pub async fn list_playlists(backend: &HttpBackend) -> Result<Vec<SourcePlaylist>, ApiError> {
    let response = backend.get(&["playlists"]).send().await?;
    let response = check_status(response, "playlists").await?;
    let json = decode::<PlaylistsResponse>(response).await?;
    Ok(json.playlists)
}

/// Starts an import of the given source playlists into `target`.
///
/// Uses `POST /api/imports/create`. The backend queues one job per playlist
/// and answers with their ids; matching then runs in the background.
///
/// # Example
///
/// ```
/// let ids = vec!["37i9dQZF1DXcBWIGoYBM5M".to_string()];
/// let jobs = create_import(&backend, &ids, Provider::Tidal).await?;
/// ```
pub async fn create_import(
    backend: &HttpBackend,
    playlist_ids: &[String],
    target: Provider,
) -> Result<Vec<JobId>, ApiError> {
    let body = CreateImportRequest {
        playlist_ids: playlist_ids.to_vec(),
        target_provider: target,
    };

    let response = backend
        .post(&["imports", "create"])
        .json(&body)
        .send()
        .await?;
    let response = check_status(response, "import").await?;
    let json = decode::<CreateImportResponse>(response).await?;
    Ok(json.jobs)
}
