use tabled::Table;

use crate::{
    backend::ReviewBackend,
    error, imports, info, success,
    types::Provider,
    utils, warning,
};

/// Lists the playlists of the connected source account.
///
/// # Output Example
///
/// ```
/// +------------------------+-----------+--------+
/// | id                     | name      | tracks |
/// +------------------------+-----------+--------+
/// | 37i9dQZF1DXcBWIGoYBM5M | Road Trip | 48     |
/// +------------------------+-----------+--------+
/// [o] Import with `plmcli import create --playlists <id>,<id> --target <provider>`
/// ```
pub async fn playlists() {
    let backend = super::backend();

    let pb = super::spinner("Fetching playlists...".to_string());
    let result = backend.list_playlists().await;
    pb.finish_and_clear();

    let playlists = match result {
        Ok(playlists) => playlists,
        Err(e) => error!("Cannot load playlists: {}", e),
    };

    if playlists.is_empty() {
        warning!("No playlists found on the source account");
        return;
    }

    println!("{}", Table::new(utils::playlist_rows(&playlists)));
    info!("Import with `plmcli import create --playlists <id>,<id> --target <provider>`");
}

/// Queues one import job per source playlist.
pub async fn create_import(playlist_ids: Vec<String>, target: Provider) {
    let backend = super::backend();

    let pb = super::spinner(format!("Starting import into {}...", target));
    let result = imports::start_import(&backend, &playlist_ids, target).await;
    pb.finish_and_clear();

    let job_ids = match result {
        Ok(job_ids) => job_ids,
        Err(e) => error!("Cannot start import: {}", e),
    };

    if job_ids.is_empty() {
        warning!("The backend did not queue any job");
        return;
    }

    for job_id in &job_ids {
        success!("Queued job {}", job_id);
    }
    if let Some(first) = job_ids.first() {
        info!("Follow progress with `plmcli status {} --watch`", first);
    }
}

/// Lists all import jobs, newest first, with their match rate.
///
/// # Output Example
///
/// ```
/// +----+-----------+--------+----------------+-------+------------+------------------+
/// | id | source    | target | status         | items | match rate | created          |
/// +----+-----------+--------+----------------+-------+------------+------------------+
/// | 43 | Focus     | Tidal  | running        | 12/40 | 30.0%      | 2025-03-02 09:10 |
/// | 42 | Road Trip | Tidal  | waiting review | 7/10  | 70.0%      | 2025-03-01 12:30 |
/// +----+-----------+--------+----------------+-------+------------+------------------+
/// [o] 1 running, 1 waiting review
/// ```
pub async fn jobs() {
    let backend = super::backend();

    let pb = super::spinner("Fetching jobs...".to_string());
    let result = imports::job_overview(&backend).await;
    pb.finish_and_clear();

    let jobs = match result {
        Ok(jobs) => jobs,
        Err(e) => error!("Cannot load jobs: {}", e),
    };

    if jobs.is_empty() {
        info!("No import jobs yet, start one with `plmcli import create`");
        return;
    }

    println!("{}", Table::new(utils::job_rows(&jobs)));

    let counts = imports::count_by_status(&jobs)
        .into_iter()
        .map(|(status, count)| format!("{} {}", count, status))
        .collect::<Vec<_>>()
        .join(", ");
    info!("{}", counts);
}
