use tabled::Table;

use crate::{
    backend::{HttpBackend, ReviewBackend},
    error,
    error::DraftError,
    info,
    management::DraftManager,
    review::DecisionStore,
    success,
    types::{Decision, ItemId, JobId, ReviewItem},
    utils, warning,
};

/// Loads the items under review together with the saved draft.
///
/// Draft entries for items that are no longer under review are dropped.
async fn load_store(
    backend: &HttpBackend,
    job_id: JobId,
) -> (Vec<ReviewItem>, DecisionStore, DraftManager) {
    let items = match backend.fetch_review_items(job_id).await {
        Ok(items) => items,
        Err(e) => error!("Cannot load review items for job {}: {}", job_id, e),
    };

    let draft = match DraftManager::load(job_id).await {
        Ok(draft) => draft,
        Err(e) => {
            warning!("Ignoring unreadable draft for job {}: {}", job_id, e);
            DraftManager::new(job_id)
        }
    };

    let mut store = DecisionStore::new(&items);
    let restored = store.restore(draft.entries());
    if restored < draft.entries().len() {
        warning!(
            "{} drafted decision(s) refer to items no longer under review and were dropped",
            draft.entries().len() - restored
        );
    }

    (items, store, draft)
}

/// Lists the uncertain matches of a job with their draft decisions.
///
/// # Output Example
///
/// ```
/// +----+----------------------+--------+-----------------------+------------------+-------+----------+
/// | id | track                | length | suggestion            | suggested length | score | decision |
/// +----+----------------------+--------+-----------------------+------------------+-------+----------+
/// | 7  | Teardrop - Massive.. | 5:31   | Teardrop - Massive .. | 5:30             | 82%   | confirm  |
/// | 8  | Angel - Massive ..   | 6:19   | Angel (Live) - Mass.. | 7:02             | 77%   | -        |
/// +----+----------------------+--------+-----------------------+------------------+-------+----------+
/// [o] Submit 1 Decision (1 item left unreviewed)
/// ```
pub async fn list_review(job_id: JobId) {
    let backend = super::backend();
    let (items, store, _) = load_store(&backend, job_id).await;

    if items.is_empty() {
        info!("Nothing is waiting for review in job {}", job_id);
        return;
    }

    println!("{}", Table::new(utils::review_rows(&items, &store)));

    let unset = items.len() - store.pending_count();
    info!(
        "{} ({} item{} left unreviewed)",
        utils::submit_label(store.pending_count()),
        unset,
        if unset == 1 { "" } else { "s" }
    );
}

/// Records decisions in the local draft of a job.
///
/// Ids are applied confirms first, then rejects, so an id passed to both ends
/// up rejected. Ids that are not under review are reported and skipped.
pub async fn decide(job_id: JobId, confirm: Vec<ItemId>, reject: Vec<ItemId>) {
    if confirm.is_empty() && reject.is_empty() {
        warning!("Nothing to record, pass --confirm and/or --reject");
        return;
    }

    let backend = super::backend();
    let (_, mut store, mut draft) = load_store(&backend, job_id).await;

    let requested = confirm
        .into_iter()
        .map(|id| (id, Decision::Confirm))
        .chain(reject.into_iter().map(|id| (id, Decision::Reject)));

    for (item_id, decision) in requested {
        if !store.set_decision(item_id, decision) {
            warning!("Item {} is not waiting for review in job {}", item_id, job_id);
        }
    }

    draft.sync_from(&store);
    if let Err(e) = draft.persist().await {
        error!("Cannot save draft for job {}: {}", job_id, e);
    }

    success!(
        "Draft saved. Next: {} with `plmcli review {} submit`",
        utils::submit_label(store.pending_count()),
        job_id
    );
}

/// Sends the drafted decisions of a job to the backend.
///
/// The batch is sent exactly once. On success the draft is removed; on
/// failure it is written back and the command can be run again.
pub async fn submit(job_id: JobId) {
    let backend = super::backend();
    let (_, store, mut draft) = load_store(&backend, job_id).await;

    if store.is_empty() {
        warning!(
            "No decisions recorded for job {}, use `plmcli review {} decide` first",
            job_id,
            job_id
        );
        return;
    }

    info!("{}", utils::submit_label(store.pending_count()));
    let pb = super::spinner(format!("Submitting decisions for job {}...", job_id));
    let result = draft.submit(&store, &backend).await;
    pb.finish_and_clear();

    match result {
        Ok(count) => success!("Submitted {} decision(s) for job {}", count, job_id),
        Err(DraftError::Submit(e)) => error!(
            "Submitting decisions failed: {}\nYour {} decision(s) are kept. Run `plmcli review {} submit` to try again.",
            e,
            store.pending_count(),
            job_id
        ),
        Err(e) => error!(
            "Draft for job {} could not be updated at {}: {}",
            job_id,
            draft.path().display(),
            e
        ),
    }
}

/// Asks the backend to build the target playlist from all confirmed matches.
pub async fn finalize(job_id: JobId) {
    let backend = super::backend();

    let draft_pending = match DraftManager::load(job_id).await {
        Ok(draft) => !draft.is_empty(),
        Err(_) => false,
    };
    if draft_pending {
        warning!(
            "Job {} has unsubmitted decisions, they are not part of the import",
            job_id
        );
    }

    match backend.finalize_job(job_id).await {
        Ok(()) => success!(
            "Import started for job {}. Follow it with `plmcli status {} --watch`",
            job_id,
            job_id
        ),
        Err(e) => error!("Cannot finalize job {}: {}", job_id, e),
    }
}
