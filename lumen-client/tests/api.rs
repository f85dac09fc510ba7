//! Client tests against an in-process fake of the generation API

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use lumen_client::{ApiClient, ClientError, JobPoller, PollConfig, PollError};
use lumen_core::domain::billing::TransactionKind;
use lumen_core::domain::job::JobState;
use lumen_core::dto::generation::GenerationRequest;
use serde_json::{Value, json};

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Answers `pending` until the n-th status check, then `completed`
fn completes_on_check(n: u32) -> (Router, Arc<AtomicU32>) {
    let checks = Arc::new(AtomicU32::new(0));

    let app = Router::new()
        .route(
            "/api/generate",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if headers.get("authorization").and_then(|v| v.to_str().ok())
                    != Some("Bearer sk-test")
                {
                    return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })));
                }
                assert!(body["prompt"].is_string());
                (StatusCode::OK, Json(json!({ "id": "job-42", "status": "pending" })))
            }),
        )
        .route(
            "/api/generate/{id}/status",
            get(
                move |State(checks): State<Arc<AtomicU32>>, Path(id): Path<String>| async move {
                    assert_eq!(id, "job-42");
                    let seen = checks.fetch_add(1, Ordering::SeqCst) + 1;
                    if seen >= n {
                        Json(json!({ "status": "completed", "imageUrl": "https://cdn/job-42.png" }))
                    } else {
                        Json(json!({ "status": "processing" }))
                    }
                },
            ),
        )
        .with_state(Arc::clone(&checks));

    (app, checks)
}

fn fast_config(max_attempts: u32) -> PollConfig {
    PollConfig::new(Duration::from_millis(5), max_attempts)
}

#[tokio::test]
async fn test_get_status_parses_wire_format() {
    let app = Router::new().route(
        "/api/generate/{id}/status",
        get(|| async { Json(json!({ "status": "failed", "errorMessage": "out of credits" })) }),
    );
    let client = ApiClient::new(spawn_server(app).await);

    let status = client.get_status("job-1").await.unwrap();

    assert_eq!(status.state, JobState::Failed);
    assert_eq!(status.error_message.as_deref(), Some("out of credits"));
    assert!(status.result_url.is_none());
}

#[tokio::test]
async fn test_job_id_is_sent_as_single_path_segment() {
    let app = Router::new().route(
        "/api/generate/{id}/status",
        get(|Path(id): Path<String>| async move {
            Json(json!({ "status": "completed", "imageUrl": format!("https://cdn/{id}.png") }))
        }),
    );
    let client = ApiClient::new(spawn_server(app).await);

    for id in ["plain", "gen/42", "a?b", "x#y", "50%"] {
        let status = client.get_status(id).await.unwrap();
        assert_eq!(
            status.result_url,
            Some(format!("https://cdn/{id}.png")),
            "job id {id:?}"
        );
    }
}

#[tokio::test]
async fn test_non_success_status_becomes_api_error() {
    let app = Router::new().route(
        "/api/generate/{id}/status",
        get(|| async { (StatusCode::NOT_FOUND, "no such job") }),
    );
    let client = ApiClient::new(spawn_server(app).await);

    let err = client.get_status("missing").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        ClientError::ApiError { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "no such job");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_becomes_parse_error() {
    let app = Router::new().route(
        "/api/generate/{id}/status",
        get(|| async { "definitely not json" }),
    );
    let client = ApiClient::new(spawn_server(app).await);

    let err = client.get_status("job-1").await.unwrap_err();

    assert!(matches!(err, ClientError::ParseError(_)));
}

#[tokio::test]
async fn test_invalid_request_is_not_sent() {
    // Nothing listens here; validation must fail before any connection attempt.
    let client = ApiClient::new("http://127.0.0.1:9");

    let err = client
        .submit_generation(&GenerationRequest::new(""))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_missing_api_key_is_rejected_by_server() {
    let (app, _) = completes_on_check(1);
    let client = ApiClient::new(spawn_server(app).await);

    let err = client
        .submit_generation(&GenerationRequest::new("a red fox"))
        .await
        .unwrap_err();

    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_poller_waits_through_http_until_completed() {
    let (app, checks) = completes_on_check(3);
    let client = ApiClient::new(spawn_server(app).await);
    let poller = JobPoller::new(&client, fast_config(10));
    let mut states = Vec::new();

    let status = poller
        .wait_for_completion(
            "job-42",
            Some(&mut |s: &lumen_core::domain::job::JobStatus, _: u32| {
                states.push(s.state.to_string())
            }),
        )
        .await
        .unwrap();

    assert_eq!(status.result_url.as_deref(), Some("https://cdn/job-42.png"));
    assert_eq!(checks.load(Ordering::SeqCst), 3);
    assert_eq!(states, vec!["processing", "processing", "completed"]);
}

#[tokio::test]
async fn test_generate_and_wait_end_to_end() {
    let (app, checks) = completes_on_check(2);
    let client = ApiClient::new(spawn_server(app).await).with_api_key("sk-test");

    let status = client
        .generate_and_wait(&GenerationRequest::new("a red fox"), fast_config(5), None)
        .await
        .unwrap();

    assert_eq!(status.state, JobState::Completed);
    assert_eq!(checks.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_generate_and_wait_times_out() {
    let (app, checks) = completes_on_check(100);
    let client = ApiClient::new(spawn_server(app).await).with_api_key("sk-test");

    let err = client
        .generate_and_wait(&GenerationRequest::new("a red fox"), fast_config(4), None)
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Timeout { attempts: 4 }));
    assert_eq!(checks.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_server_error_during_poll_is_transport_failure() {
    let app = Router::new().route(
        "/api/generate/{id}/status",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let client = ApiClient::new(spawn_server(app).await);
    let poller = JobPoller::new(&client, fast_config(10));

    let err = poller.wait_for_completion("job-1", None).await.unwrap_err();

    let transport = err.into_transport().expect("transport error");
    assert!(transport.is_server_error());
}

#[tokio::test]
async fn test_billing_endpoints() {
    let app = Router::new()
        .route(
            "/api/billing/balance",
            get(|| async { Json(json!({ "credits": 120, "plan": "pro" })) }),
        )
        .route(
            "/api/billing/transactions",
            get(|| async {
                Json(json!([
                    { "id": "tx_1", "amount": 200, "type": "purchase", "createdAt": "2024-05-01T10:00:00Z" },
                    { "id": "tx_2", "amount": -80, "type": "usage", "description": "40 images", "createdAt": "2024-05-02T10:00:00Z" }
                ]))
            }),
        );
    let client = ApiClient::new(spawn_server(app).await);

    let balance = client.get_balance().await.unwrap();
    assert_eq!(balance.credits, 120);
    assert_eq!(balance.plan.as_deref(), Some("pro"));

    let transactions = client.list_transactions().await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].kind, TransactionKind::Purchase);
    assert_eq!(transactions[1].description.as_deref(), Some("40 images"));
}

#[tokio::test]
async fn test_list_generations() {
    let app = Router::new().route(
        "/api/generate/history",
        get(|| async {
            Json(json!([
                { "id": "job-1", "prompt": "a fox", "status": "completed", "imageUrl": "https://cdn/1.png", "createdAt": "2024-05-01T10:00:00Z" },
                { "id": "job-2", "prompt": "a cat", "status": "pending", "createdAt": "2024-05-02T10:00:00Z" }
            ]))
        }),
    );
    let client = ApiClient::new(spawn_server(app).await);

    let history = client.list_generations().await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[1].status, JobState::Pending);
    assert!(history[1].image_url.is_none());
}
