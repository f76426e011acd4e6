use tabled::Table;

use crate::{
    backend::ReviewBackend,
    config, error,
    error::RetryError,
    info,
    management::RetryLedger,
    review::{RetryStatus, ReviewSession},
    success,
    types::{ItemId, JobId, SearchFilter},
    utils, warning,
};

/// Options of the `retry` command.
#[derive(Debug, Clone, Default)]
pub struct RetryOptions {
    pub item: Option<ItemId>,
    pub all: bool,
    pub query: Option<String>,
    pub filter: Option<SearchFilter>,
    pub top_k: Option<u32>,
    pub pick: Option<String>,
}

/// Runs a second-chance search for tracks the matcher could not place.
///
/// With `--all` every missed track is searched concurrently and the outcome is
/// shown as one table. With `--item` a single track is searched, optionally
/// with an edited query and filter, and the suggestions are listed. Passing
/// `--pick` afterwards adds the chosen suggestion to the job's target playlist.
///
/// # Error Handling
///
/// A search that fails or finds nothing only marks its own track as failed.
/// Picking a suggestion requires the job to have created a target playlist;
/// without one the pick is refused before any request is made. A track that
/// was added in an earlier run is restored as succeeded and refuses further
/// retries.
pub async fn retry(job_id: JobId, opts: RetryOptions) {
    let backend = super::backend();

    let details = match backend.fetch_job(job_id).await {
        Ok(details) => details,
        Err(e) => error!("Cannot load job {}: {}", job_id, e),
    };
    let mut session = ReviewSession::new(job_id, Vec::new(), Some(&details));

    let mut ledger = match RetryLedger::load(job_id).await {
        Ok(ledger) => ledger,
        Err(e) => {
            warning!("Ignoring unreadable retry history for job {}: {}", job_id, e);
            RetryLedger::new(job_id)
        }
    };
    session.restore_retries(ledger.settled());

    if session.retries().is_empty() {
        info!("Every track of job {} found a match", job_id);
        return;
    }

    let top_k = opts.top_k.unwrap_or_else(config::retry_top_k);

    if opts.all {
        retry_all(&backend, &mut session, opts.filter, top_k).await;
        return;
    }

    let Some(item_id) = opts.item else {
        error!("Pass --item <id> to retry one track or --all to retry every missed track");
    };

    if let Some(state) = session.retries().get(item_id) {
        if state.status() == RetryStatus::Success {
            let title = state.selected().map(|s| s.title.as_str()).unwrap_or("-");
            info!(
                "Item {} was already added to the playlist as \"{}\"",
                item_id, title
            );
            return;
        }
    }

    if let Some(query) = opts.query {
        if let Err(e) = session.retries_mut().edit_query(item_id, query) {
            error!("Cannot edit query of item {}: {}", item_id, e);
        }
    }
    if let Some(filter) = opts.filter {
        if let Err(e) = session.retries_mut().set_filter(item_id, filter) {
            error!("Cannot change filter of item {}: {}", item_id, e);
        }
    }

    let query = match session.retries().get(item_id) {
        Some(state) => state.edited_query().to_string(),
        None => error!("Item {} is not a missed track of job {}", item_id, job_id),
    };

    let pb = super::spinner(format!("Searching for \"{}\"...", query));
    let status = session.retry_search(item_id, &backend, top_k).await;
    pb.finish_and_clear();

    let status = match status {
        Ok(status) => status,
        Err(e) => error!("Retry for item {} failed: {}", item_id, e),
    };

    let Some(state) = session.retries().get(item_id) else {
        error!("Item {} is not a missed track of job {}", item_id, job_id);
    };

    if status != RetryStatus::Pending {
        warning!(
            "No match for \"{}\": {}",
            query,
            state.last_error().unwrap_or("search failed")
        );
        info!("Edit the query with --query or change --filter and try again");
        return;
    }

    info!("{} suggestion(s) for \"{}\":", state.suggestions().len(), query);
    println!("{}", Table::new(utils::suggestion_rows(state.suggestions())));

    let Some(pick) = opts.pick else {
        info!(
            "Add one with `plmcli retry {} --item {} --pick <id>`",
            job_id, item_id
        );
        return;
    };

    let pb = super::spinner(format!("Adding {} to the target playlist...", pick));
    let added = session.add_suggestion(item_id, &pick, &backend).await;
    pb.finish_and_clear();

    match added {
        Ok(RetryStatus::Success) => {
            ledger.record_from(session.retries());
            if let Err(e) = ledger.persist().await {
                warning!("Cannot save retry history for job {}: {}", job_id, e);
            }
            let title = session
                .retries()
                .get(item_id)
                .and_then(|state| state.selected())
                .map(|s| s.title.clone())
                .unwrap_or(pick);
            success!("Added \"{}\" to the playlist of job {}", title, job_id);
        }
        Ok(_) => {
            let reason = session
                .retries()
                .get(item_id)
                .and_then(|state| state.last_error().map(str::to_string))
                .unwrap_or_else(|| "unknown error".to_string());
            warning!("Adding {} failed: {}", pick, reason);
        }
        Err(RetryError::MissingPlaylist) => error!(
            "Job {} has no target playlist yet, run `plmcli review {} finalize` first",
            job_id,
            job_id
        ),
        Err(e) => error!("Cannot add {}: {}", pick, e),
    }
}

async fn retry_all<B>(
    backend: &B,
    session: &mut ReviewSession,
    filter: Option<SearchFilter>,
    top_k: u32,
) where
    B: ReviewBackend + Clone + Send + Sync + 'static,
{
    if let Some(filter) = filter {
        let item_ids: Vec<ItemId> = session
            .retries()
            .states()
            .filter(|s| s.status() != RetryStatus::Success)
            .map(|s| s.item_id())
            .collect();
        for item_id in item_ids {
            if let Err(e) = session.retries_mut().set_filter(item_id, filter) {
                warning!("Keeping previous filter for item {}: {}", item_id, e);
            }
        }
    }

    let pb = super::spinner(format!(
        "Searching {} missed track(s)...",
        session.retries().len()
    ));
    let outcome = session.retries_mut().search_all(backend, top_k).await;
    pb.finish_and_clear();

    println!("{}", Table::new(utils::missed_rows(session.retries())));

    let found = outcome
        .iter()
        .filter(|(_, status)| *status == RetryStatus::Pending)
        .count();
    if found > 0 {
        success!(
            "{} of {} track(s) have new suggestions, inspect one with `plmcli retry {} --item <id>`",
            found,
            outcome.len(),
            session.job_id()
        );
    } else {
        warning!("No new suggestions for any missed track");
    }
}
