use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use plmcli::{
    backend::{HttpBackend, ReviewBackend},
    error::ApiError,
    types::{Decision, DecisionEntry, ItemId, JobId, JobStatus, Provider, SearchFilter},
};
use serde_json::{Value, json};

#[derive(Default)]
struct Seen {
    queries: Vec<HashMap<String, String>>,
    playlists: Vec<String>,
    bodies: Vec<Value>,
    auth: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Seen>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn job_json() -> Value {
    json!({
        "id": 42,
        "status": "waiting_review",
        "source_playlist_id": "37i9dQZF1DXcBWIGoYBM5M",
        "source_playlist_name": "Road Trip",
        "target_provider": "tidal",
        "target_playlist_id": "pl-1",
        "stats": {"total": 10, "matched": 7, "uncertain": 2, "failed": 1},
        "missed": [
            {"id": 13, "original_track": {"name": "Dissolved Girl", "artists": ["Massive Attack"]}}
        ]
    })
}

fn mock_backend(seen: Shared) -> Router {
    Router::new()
        .route(
            "/api/imports/{id}",
            get({
                let seen = seen.clone();
                move |Path(id): Path<u64>, headers: HeaderMap| async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    seen.lock().unwrap().auth.push(auth);
                    match id {
                        42 => Ok(Json(job_json())),
                        _ => Err(StatusCode::NOT_FOUND),
                    }
                }
            }),
        )
        .route(
            "/api/imports/{id}/review",
            get(|Path(id): Path<u64>| async move {
                match id {
                    42 => (
                        StatusCode::OK,
                        json!({"items": [{
                            "id": 7,
                            "original_track": {"name": "Teardrop", "artists": ["Massive Attack"], "duration_ms": 331000},
                            "suggested_match": {"title": "Teardrop", "artists": ["Massive Attack"], "duration": 330, "_score": 0.82}
                        }]})
                        .to_string(),
                    ),
                    // body that does not match the expected shape
                    _ => (StatusCode::OK, r#"{"items": 5}"#.to_string()),
                }
            })
            .post({
                let seen = seen.clone();
                move |Json(body): Json<Value>| async move {
                    let unknown = body["decisions"]
                        .as_array()
                        .is_some_and(|d| d.iter().any(|e| e["item_id"] == 99));
                    seen.lock().unwrap().bodies.push(body);
                    if unknown {
                        (StatusCode::CONFLICT, "item 99 is not part of job 42")
                    } else {
                        (StatusCode::NO_CONTENT, "")
                    }
                }
            }),
        )
        .route(
            "/api/imports/{id}/finalize",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "worker queue is down") }),
        )
        .route(
            "/api/search",
            get({
                let seen = seen.clone();
                move |Query(params): Query<HashMap<String, String>>| async move {
                    seen.lock().unwrap().queries.push(params);
                    Json(json!({"results": [
                        {"id": "v-1", "title": "Teardrop (Live)", "artists": ["Massive Attack"], "duration": 345}
                    ]}))
                }
            }),
        )
        .route(
            "/api/playlists/{playlist}/tracks",
            post({
                let seen = seen.clone();
                move |Path(playlist): Path<String>, Json(body): Json<Value>| async move {
                    let mut seen = seen.lock().unwrap();
                    seen.playlists.push(playlist);
                    seen.bodies.push(body);
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .route(
            "/api/playlists",
            get(|| async {
                Json(json!({"playlists": [
                    {"id": "37i9dQZF1DXcBWIGoYBM5M", "name": "Road Trip", "tracks": 48}
                ]}))
            }),
        )
        .route(
            "/api/imports/create",
            post({
                let seen = seen.clone();
                move |Json(body): Json<Value>| async move {
                    seen.lock().unwrap().bodies.push(body);
                    Json(json!({"jobs": [101, 102]}))
                }
            }),
        )
        .route(
            "/api/imports",
            get(|| async {
                Json(json!({"jobs": [{
                    "id": 42,
                    "source_playlist_id": "37i9dQZF1DXcBWIGoYBM5M",
                    "status": "running",
                    "target_provider": "ytm",
                    "total_items": 40,
                    "matched_items": 12
                }]}))
            }),
        )
}

async fn setup(token: Option<&str>) -> (HttpBackend, Shared) {
    let seen = Shared::default();
    let base = serve(mock_backend(seen.clone())).await;
    let backend = HttpBackend::new(&format!("{}/", base), token.map(str::to_string)).unwrap();
    (backend, seen)
}

#[tokio::test]
async fn test_fetch_job_sends_token_and_decodes() {
    let (backend, seen) = setup(Some("secret")).await;

    let details = backend.fetch_job(JobId(42)).await.unwrap();

    assert_eq!(details.status, JobStatus::WaitingReview);
    assert_eq!(details.target_playlist_id.as_deref(), Some("pl-1"));
    assert_eq!(details.missed.len(), 1);
    assert_eq!(
        seen.lock().unwrap().auth,
        vec![Some("Bearer secret".to_string())]
    );
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let (backend, _) = setup(None).await;

    let result = backend.fetch_job(JobId(7)).await;

    assert!(matches!(result, Err(ApiError::NotFound(resource)) if resource == "job 7"));
}

#[tokio::test]
async fn test_fetch_review_items_accepts_matcher_fields() {
    let (backend, _) = setup(None).await;

    let items = backend.fetch_review_items(JobId(42)).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ItemId(7));
    let suggested = items[0].suggested_match.as_ref().unwrap();
    assert_eq!(suggested.duration_seconds, Some(330));
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() {
    let (backend, _) = setup(None).await;

    let result = backend.fetch_review_items(JobId(1)).await;

    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_submit_sends_decision_batch() {
    let (backend, seen) = setup(None).await;
    let batch = vec![
        DecisionEntry {
            item_id: ItemId(7),
            decision: Decision::Confirm,
        },
        DecisionEntry {
            item_id: ItemId(8),
            decision: Decision::Reject,
        },
    ];

    backend.submit_decisions(JobId(42), &batch).await.unwrap();

    assert_eq!(
        seen.lock().unwrap().bodies,
        vec![json!({"decisions": [
            {"item_id": 7, "decision": "confirm"},
            {"item_id": 8, "decision": "reject"}
        ]})]
    );
}

#[tokio::test]
async fn test_conflict_is_validation_with_body() {
    let (backend, _) = setup(None).await;
    let batch = vec![DecisionEntry {
        item_id: ItemId(99),
        decision: Decision::Confirm,
    }];

    let result = backend.submit_decisions(JobId(42), &batch).await;

    assert!(matches!(
        result,
        Err(ApiError::Validation(body)) if body == "item 99 is not part of job 42"
    ));
}

#[tokio::test]
async fn test_other_status_is_server_error() {
    let (backend, _) = setup(None).await;

    let result = backend.finalize_job(JobId(42)).await;

    assert!(matches!(
        result,
        Err(ApiError::Server { status: 503, body }) if body == "worker queue is down"
    ));
}

#[tokio::test]
async fn test_retry_search_sends_query_parameters() {
    let (backend, seen) = setup(None).await;

    let results = backend
        .retry_search("Teardrop live & loud", SearchFilter::Videos, 3)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].duration_seconds, Some(345));
    let queries = &seen.lock().unwrap().queries;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["q"], "Teardrop live & loud");
    assert_eq!(queries[0]["filter"], "videos");
    assert_eq!(queries[0]["top_k"], "3");
}

#[tokio::test]
async fn test_playlist_id_is_one_path_segment() {
    let (backend, seen) = setup(None).await;

    backend
        .add_track_to_playlist("mix/2025?#1", "v-1")
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.playlists, vec!["mix/2025?#1".to_string()]);
    assert_eq!(seen.bodies, vec![json!({"suggestion_id": "v-1"})]);
}

#[tokio::test]
async fn test_list_playlists_and_jobs() {
    let (backend, _) = setup(None).await;

    let playlists = backend.list_playlists().await.unwrap();
    let jobs = backend.list_jobs().await.unwrap();

    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].tracks, 48);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Running);
    assert_eq!(jobs[0].target_provider, Provider::Ytm);
    assert_eq!(jobs[0].match_rate(), 30.0);
}

#[tokio::test]
async fn test_create_import_posts_ids_and_target() {
    let (backend, seen) = setup(None).await;
    let ids = vec!["a".to_string(), "b".to_string()];

    let jobs = backend.create_import(&ids, Provider::Tidal).await.unwrap();

    assert_eq!(jobs, vec![JobId(101), JobId(102)]);
    assert_eq!(
        seen.lock().unwrap().bodies,
        vec![json!({"playlist_ids": ["a", "b"], "target_provider": "tidal"})]
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = HttpBackend::new(&format!("http://{}", addr), None).unwrap();

    let result = backend.fetch_job_stats(JobId(42)).await;

    assert!(matches!(result, Err(ApiError::Network(_))));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    assert!(matches!(
        HttpBackend::new("localhost:8000", None),
        Err(ApiError::InvalidUrl(_))
    ));
    assert!(matches!(
        HttpBackend::new("not a url", None),
        Err(ApiError::InvalidUrl(_))
    ));
}
