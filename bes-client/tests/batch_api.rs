//! Batch service client against an in-process mock of the jobs API

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bes_client::{BatchClient, ClientError};
use bes_core::domain::blob::BlobReference;
use bes_core::domain::job::StatusCode as JobCode;
use bes_core::dto::job::ExecutionRequest;
use serde_json::{Value, json};

#[derive(Default)]
struct Recorded {
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Option<Value>>,
}

type Shared = Arc<Recorded>;

fn check(headers: &HeaderMap, query: &HashMap<String, String>) -> Result<(), StatusCode> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer secret-key");
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if query.get("api-version").map(String::as_str) != Some("2.0") {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

async fn submit(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<Json<String>, StatusCode> {
    check(&headers, &query)?;
    state.calls.lock().unwrap().push("submit".to_string());
    *state.submitted.lock().unwrap() = Some(body);
    Ok(Json("job-123".to_string()))
}

async fn start(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<StatusCode, StatusCode> {
    check(&headers, &query)?;
    state.calls.lock().unwrap().push(format!("start {}", id));
    Ok(StatusCode::OK)
}

async fn status(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    check(&headers, &query)?;
    state.calls.lock().unwrap().push(format!("status {}", id));
    Ok(Json(json!({
        "StatusCode": "Finished",
        "Results": {
            "trainedmodel": {
                "ConnectionString": null,
                "RelativeLocation": "/c/trainedmodelresults.ilearner",
                "BaseLocation": "https://acct.blob.core.windows.net/",
                "SasBlobToken": "?sig=1"
            }
        },
        "Details": null
    })))
}

async fn delete(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<StatusCode, StatusCode> {
    check(&headers, &query)?;
    state.calls.lock().unwrap().push(format!("delete {}", id));
    Ok(StatusCode::NO_CONTENT)
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn mock_service() -> (String, Shared) {
    let state = Shared::default();
    let router = Router::new()
        .route("/jobs", post(submit))
        .route("/jobs/{id}/start", post(start))
        .route("/jobs/{id}", get(status).delete(delete))
        .with_state(state.clone());
    (spawn(router).await, state)
}

#[tokio::test]
async fn test_job_lifecycle_wire_format() -> anyhow::Result<()> {
    let (base, state) = mock_service().await;
    let client = BatchClient::new(format!("{}/jobs/", base), "secret-key");

    let request = ExecutionRequest::new()
        .with_input(
            "newdata",
            BlobReference::account("AccountName=a;AccountKey=k", "c/in.csv"),
        )
        .with_parameter("Threshold", "0.5");

    let job_id = client.submit_job(&request).await?;
    assert_eq!(job_id, "job-123");

    client.start_job(&job_id).await?;
    let status = client.get_job_status(&job_id).await?;
    client.delete_job(&job_id).await?;

    assert_eq!(status.status_code, JobCode::Finished);
    let results = status.results.expect("finished status carries results");
    assert_eq!(
        results["trainedmodel"].relative_location(),
        "/c/trainedmodelresults.ilearner"
    );

    let calls = state.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        ["submit", "start job-123", "status job-123", "delete job-123"]
    );

    let submitted = state.submitted.lock().unwrap().clone().unwrap();
    assert_eq!(
        submitted["Inputs"]["newdata"]["RelativeLocation"],
        json!("c/in.csv")
    );
    assert_eq!(submitted["GlobalParameters"]["Threshold"], json!("0.5"));
    Ok(())
}

#[tokio::test]
async fn test_wrong_key_reports_status() {
    let (base, _state) = mock_service().await;
    let client = BatchClient::new(format!("{}/jobs", base), "wrong-key");

    let err = client.start_job("job-123").await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_failed_submission_keeps_headers_and_body() {
    let router = Router::new().route(
        "/jobs",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                [("x-ms-request-id", "req-7")],
                "{\"error\":{\"code\":\"BadArgument\"}}",
            )
        }),
    );
    let base = spawn(router).await;
    let client = BatchClient::new(format!("{}/jobs", base), "secret-key");

    let err = client
        .submit_job(&ExecutionRequest::new())
        .await
        .unwrap_err();

    match &err {
        ClientError::ApiError {
            status,
            headers,
            body,
        } => {
            assert_eq!(*status, reqwest::StatusCode::BAD_REQUEST);
            assert_eq!(headers["x-ms-request-id"], "req-7");
            assert!(body.contains("BadArgument"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.render_headers().contains("x-ms-request-id: req-7"));
}

#[tokio::test]
async fn test_unknown_status_code_is_parse_error() {
    let router = Router::new().route(
        "/jobs/{id}",
        get(|| async { Json(json!({ "StatusCode": "Paused" })) }),
    );
    let base = spawn(router).await;
    let client = BatchClient::new(format!("{}/jobs", base), "secret-key");

    let err = client.get_job_status("job-1").await.unwrap_err();
    assert!(matches!(err, ClientError::ParseError(_)));
}
