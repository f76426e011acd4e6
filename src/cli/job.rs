use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::time::sleep;

use crate::{
    backend::ReviewBackend,
    config, error, info,
    review::{ProgressShares, ReviewSession},
    success,
    types::{JobId, JobStats},
    utils, warning,
};

/// Displays a summary of one import job.
///
/// Shows source and target, the current status, progress shares and a table
/// of the tracks the matcher could not place.
///
/// # Output Example
///
/// ```
/// [o] Job 42: Road Trip -> Tidal
/// [o] Status: waiting review
/// [o] Matched: 7/10 (70.0%)
/// [o] Uncertain: 2/10 (20.0%)
/// [o] Failed: 1/10 (10.0%)
/// [o] 1 track without match, try `plmcli retry 42 --all`
/// ```
pub async fn job(job_id: JobId) {
    let backend = super::backend();

    let pb = super::spinner(format!("Fetching job {}...", job_id));
    let details = match backend.fetch_job(job_id).await {
        Ok(details) => details,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot load job {}: {}", job_id, e)
        }
    };
    pb.finish_and_clear();

    let session = ReviewSession::new(job_id, Vec::new(), Some(&details));
    let source = details
        .source_playlist_name
        .clone()
        .unwrap_or_else(|| details.source_playlist_id.clone());

    info!("Job {}: {} -> {}", job_id, source, details.target_provider);
    info!("Status: {}", details.status);
    if let Some(created_at) = details.created_at {
        info!("Created: {}", created_at.format("%Y-%m-%d %H:%M"));
    }
    if let Some(playlist_id) = &details.target_playlist_id {
        info!("Target playlist: {}", playlist_id);
    }
    if let Some(message) = &details.error_message {
        warning!("Backend reported: {}", message);
    }

    print_progress(&details.stats);

    let missed = session.retries().len();
    if missed > 0 {
        info!(
            "{} track{} without match, try `plmcli retry {} --all`",
            missed,
            if missed == 1 { "" } else { "s" },
            job_id
        );
        println!("{}", Table::new(utils::missed_rows(session.retries())));
    }
}

/// Displays the counters of a job, optionally polling until it settles.
///
/// With `watch` the job is polled every `interval` seconds (default from
/// `PLMCLI_POLL_INTERVAL_SECS`) and rendered as a progress bar until the
/// backend stops working on it, i.e. the job is waiting for review, done or
/// failed. Polls only refresh backend-owned fields.
///
/// A failing poll ends the watch; the command can be started again.
pub async fn status(job_id: JobId, watch: bool, interval: Option<u64>) {
    let backend = super::backend();

    let details = match backend.fetch_job(job_id).await {
        Ok(details) => details,
        Err(e) => error!("Cannot load job {}: {}", job_id, e),
    };

    if !watch || !details.status.is_active() {
        info!("Status: {}", details.status);
        print_progress(&details.stats);
        return;
    }

    let interval = interval
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(config::poll_interval);

    let mut session = ReviewSession::new(job_id, Vec::new(), Some(&details));
    let pb = ProgressBar::new(details.stats.total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }

    loop {
        let stats = match session.refresh_stats(&backend).await {
            Ok(stats) => stats,
            Err(e) => {
                pb.abandon();
                error!("Polling job {} failed: {}", job_id, e)
            }
        };
        pb.set_length(stats.total as u64);
        pb.set_position(stats.processed());
        pb.set_message(shares_message(&session.progress()));

        match backend.fetch_job(job_id).await {
            Ok(details) => session.apply_details(&details),
            Err(e) => {
                pb.abandon();
                error!("Polling job {} failed: {}", job_id, e)
            }
        }

        let Some(status) = session.remote().status else {
            break;
        };
        if !status.is_active() {
            pb.finish();
            success!("Job {} is {}", job_id, status);
            break;
        }

        sleep(interval).await;
    }

    if let Some(stats) = session.remote().stats {
        print_progress(&stats);
    }
}

fn shares_message(shares: &ProgressShares) -> String {
    format!(
        "matched {} / uncertain {} / failed {}",
        utils::format_share(shares.matched),
        utils::format_share(shares.uncertain),
        utils::format_share(shares.failed)
    )
}

fn print_progress(stats: &JobStats) {
    let shares = ProgressShares::from_stats(stats);
    info!(
        "Matched: {}/{} ({})",
        stats.matched,
        stats.total,
        utils::format_share(shares.matched)
    );
    info!(
        "Uncertain: {}/{} ({})",
        stats.uncertain,
        stats.total,
        utils::format_share(shares.uncertain)
    );
    info!(
        "Failed: {}/{} ({})",
        stats.failed,
        stats.total,
        utils::format_share(shares.failed)
    );
}
