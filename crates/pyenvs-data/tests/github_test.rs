use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pyenvs_data::{Artifact, GithubClient};
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

const REPO: &str = "FFY00/python-environments";

/// State of the stub GitHub API: the name of the only artifact of run 7
/// and a counter of requests answered by the API routes.
#[derive(Clone)]
struct StubApi {
    artifact: String,
    hits: Arc<AtomicUsize>,
}

async fn runs(
    State(api): State<StubApi>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    api.hits.fetch_add(1, Ordering::SeqCst);
    if query.get("head_sha").map(String::as_str) != Some("abc123") {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "total_count": 2,
        "workflow_runs": [
            {"id": 6, "name": "lint"},
            {"id": 7, "name": "build"},
        ],
    })))
}

async fn artifacts(State(api): State<StubApi>) -> Json<Value> {
    api.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "total_count": 1,
        "artifacts": [
            {"id": 99, "name": api.artifact, "archive_download_url": "http://invalid/99"},
        ],
    }))
}

fn github_api(artifact: &str) -> (Router, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = StubApi {
        artifact: artifact.to_owned(),
        hits: Arc::clone(&hits),
    };
    let app = Router::new()
        .route(&format!("/repos/{REPO}/actions/runs"), get(runs))
        .route(
            &format!("/repos/{REPO}/actions/runs/7/artifacts"),
            get(artifacts),
        )
        .route("/download/99", get(|| async { "PK-archive-bytes" }))
        .with_state(state);
    (app, hits)
}

/// Serve `app` on an ephemeral local port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    base
}

async fn client_with(artifact: &str) -> (GithubClient, Arc<AtomicUsize>) {
    let (app, hits) = github_api(artifact);
    let base = serve(app).await;
    let client = GithubClient::new(REPO, Some(SecretString::from("token".to_owned())))
        .unwrap()
        .with_base_url(base);
    (client, hits)
}

#[tokio::test]
async fn artifact_of_named_run_is_found() {
    let (client, _) = client_with("image-data").await;

    let artifact = client
        .find_artifact("build", "image-data", "abc123", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(artifact.id, 99);
    assert_eq!(artifact.name, "image-data");
}

#[tokio::test]
async fn single_lookup_without_timeout() {
    let (client, hits) = client_with("other").await;

    let artifact = client
        .find_artifact("build", "image-data", "abc123", None)
        .await
        .unwrap();
    assert_eq!(artifact, None);
    // one runs listing plus one artifact listing
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn timeout_bounds_the_number_of_lookups() {
    let (client, hits) = client_with("other").await;

    let artifact = client
        .find_artifact("build", "image-data", "abc123", Some(2))
        .await
        .unwrap();
    assert_eq!(artifact, None);
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn missing_run_is_not_an_error() {
    let (client, _) = client_with("image-data").await;

    let artifact = client
        .find_artifact("release", "image-data", "abc123", None)
        .await
        .unwrap();
    assert_eq!(artifact, None);
}

#[tokio::test]
async fn download_writes_archive() {
    let (app, _) = github_api("image-data");
    let base = serve(app).await;
    let client = GithubClient::new(REPO, None).unwrap().with_base_url(&base);
    let artifact = Artifact {
        id: 99,
        name: "image-data".to_owned(),
        archive_download_url: format!("{base}/download/99"),
    };

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("image-data.zip");
    client.download_artifact(&artifact, &path).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "PK-archive-bytes");
}

#[tokio::test]
async fn http_errors_carry_the_url() {
    let base = serve(Router::new()).await;
    let client = GithubClient::new(REPO, None).unwrap().with_base_url(&base);

    let err = client
        .find_artifact("build", "image-data", "abc123", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("/actions/runs?head_sha=abc123"));
}
