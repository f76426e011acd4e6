mod common;

use common::{FakeBackend, job_details, missed, review_item, suggestion};
use plmcli::{
    error::{DraftError, RetryError},
    management::{DraftManager, RetryLedger},
    review::{DecisionStore, RetryStatus, ReviewSession},
    types::{Decision, DecisionEntry, ItemId, JobId},
};
use tempfile::TempDir;

fn store_with_decisions() -> DecisionStore {
    let items = vec![review_item(1, "Teardrop", 0.82), review_item(2, "Angel", 0.77)];
    let mut store = DecisionStore::new(&items);
    store.set_decision(ItemId(2), Decision::Reject);
    store.set_decision(ItemId(1), Decision::Confirm);
    store
}

#[tokio::test]
async fn test_missing_draft_loads_empty() {
    let dir = TempDir::new().unwrap();

    let draft = DraftManager::load_from(dir.path(), JobId(42)).await.unwrap();

    assert!(draft.is_empty());
    assert!(!draft.path().exists());
}

#[tokio::test]
async fn test_draft_persist_and_load_keeps_order() {
    let dir = TempDir::new().unwrap();
    let mut draft = DraftManager::with_dir(dir.path(), JobId(42));
    draft.sync_from(&store_with_decisions());
    draft.persist().await.unwrap();

    let loaded = DraftManager::load_from(dir.path(), JobId(42)).await.unwrap();

    assert!(loaded.path().ends_with("drafts/job_42.json"));
    assert_eq!(
        loaded.entries(),
        &[
            DecisionEntry {
                item_id: ItemId(2),
                decision: Decision::Reject
            },
            DecisionEntry {
                item_id: ItemId(1),
                decision: Decision::Confirm
            },
        ]
    );
}

#[tokio::test]
async fn test_corrupt_draft_is_reported() {
    let dir = TempDir::new().unwrap();
    let draft = DraftManager::with_dir(dir.path(), JobId(42));
    std::fs::create_dir_all(draft.path().parent().unwrap()).unwrap();
    std::fs::write(draft.path(), "not json").unwrap();

    let result = DraftManager::load_from(dir.path(), JobId(42)).await;

    assert!(matches!(result, Err(DraftError::SerdeError(_))));
}

#[tokio::test]
async fn test_successful_submit_removes_draft() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::default();
    let store = store_with_decisions();
    let mut draft = DraftManager::with_dir(dir.path(), JobId(42));
    draft.sync_from(&store);
    draft.persist().await.unwrap();

    let sent = draft.submit(&store, &backend).await.unwrap();

    assert_eq!(sent, 2);
    assert_eq!(backend.submitted().len(), 1);
    assert!(draft.is_empty());
    assert!(!draft.path().exists());
}

#[tokio::test]
async fn test_failed_submit_keeps_draft_on_disk() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::default();
    backend.state.lock().unwrap().submit_fails = true;
    let store = store_with_decisions();
    let mut draft = DraftManager::with_dir(dir.path(), JobId(42));

    let result = draft.submit(&store, &backend).await;

    assert!(matches!(result, Err(DraftError::Submit(_))));
    let loaded = DraftManager::load_from(dir.path(), JobId(42)).await.unwrap();
    assert_eq!(loaded.entries(), store.build_submission().as_slice());
}

#[tokio::test]
async fn test_retry_success_survives_a_new_session() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::with_results(
        "Teardrop Massive Attack",
        vec![suggestion("s-1", "Teardrop")],
    );
    let details = job_details(Some("pl-1"), vec![missed(1, "Teardrop")]);

    // first run adds the pick and records it
    let mut first = ReviewSession::new(JobId(42), Vec::new(), Some(&details));
    first.retry_search(ItemId(1), &backend, 5).await.unwrap();
    let status = first
        .add_suggestion(ItemId(1), "s-1", &backend)
        .await
        .unwrap();
    assert_eq!(status, RetryStatus::Success);
    let mut ledger = RetryLedger::load_from(dir.path(), JobId(42)).await.unwrap();
    assert_eq!(ledger.record_from(first.retries()), 1);
    ledger.persist().await.unwrap();

    // second run starts from the same job details
    let ledger = RetryLedger::load_from(dir.path(), JobId(42)).await.unwrap();
    let mut second = ReviewSession::new(JobId(42), Vec::new(), Some(&details));
    assert_eq!(second.restore_retries(ledger.settled()), 1);

    let state = second.retries().get(ItemId(1)).unwrap();
    assert_eq!(state.status(), RetryStatus::Success);
    assert_eq!(state.selected().map(|s| s.id.as_str()), Some("s-1"));

    let searched = second.retry_search(ItemId(1), &backend, 5).await.unwrap();
    let added = second.add_suggestion(ItemId(1), "s-1", &backend).await;

    assert_eq!(searched, RetryStatus::Success);
    assert_eq!(
        added,
        Err(RetryError::NotAwaitingSelection(RetryStatus::Success))
    );
    assert_eq!(backend.added().len(), 1);
    assert_eq!(backend.search_calls().len(), 1);
}

#[tokio::test]
async fn test_ledger_records_each_item_once() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::with_results(
        "Teardrop Massive Attack",
        vec![suggestion("s-1", "Teardrop")],
    );
    let details = job_details(Some("pl-1"), vec![missed(1, "Teardrop"), missed(2, "Angel")]);
    let mut session = ReviewSession::new(JobId(42), Vec::new(), Some(&details));
    session.retry_search(ItemId(1), &backend, 5).await.unwrap();
    session
        .add_suggestion(ItemId(1), "s-1", &backend)
        .await
        .unwrap();

    let mut ledger = RetryLedger::with_dir(dir.path(), JobId(42));

    assert_eq!(ledger.record_from(session.retries()), 1);
    assert_eq!(ledger.record_from(session.retries()), 0);
    assert_eq!(ledger.settled().len(), 1);
    assert_eq!(ledger.settled()[0].item_id, ItemId(1));
}
