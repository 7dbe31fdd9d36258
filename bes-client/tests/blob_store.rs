//! Blob client against an in-process mock of the blob REST API

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::put;
use axum::Router;
use bes_client::{BlobClient, ClientError};

#[derive(Default)]
struct Store {
    containers: Mutex<HashSet<String>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

type Shared = Arc<Store>;

fn signed(headers: &HeaderMap) -> bool {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("SharedKey acct:"));
    authorized && headers.contains_key("x-ms-date") && headers.contains_key("x-ms-version")
}

async fn create_container(
    State(store): State<Shared>,
    Path(container): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> StatusCode {
    if !signed(&headers) {
        return StatusCode::FORBIDDEN;
    }
    if query.get("restype").map(String::as_str) != Some("container") {
        return StatusCode::BAD_REQUEST;
    }
    if store.containers.lock().unwrap().insert(container) {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

async fn put_blob(
    State(store): State<Shared>,
    Path((container, blob)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !signed(&headers) {
        return StatusCode::FORBIDDEN;
    }
    if headers.get("x-ms-blob-type").and_then(|v| v.to_str().ok()) != Some("BlockBlob") {
        return StatusCode::BAD_REQUEST;
    }
    if !store.containers.lock().unwrap().contains(&container) {
        return StatusCode::NOT_FOUND;
    }
    store
        .blobs
        .lock()
        .unwrap()
        .insert(format!("{}/{}", container, blob), body.to_vec());
    StatusCode::CREATED
}

async fn mock_store() -> (BlobClient, Shared) {
    let store = Shared::default();
    let router = Router::new()
        .route("/{container}", put(create_container))
        .route("/{container}/{*blob}", put(put_blob))
        .with_state(store.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = BlobClient::from_connection_string(&format!(
        "DefaultEndpointsProtocol=http;AccountName=acct;AccountKey=a2V5;BlobEndpoint=http://{}",
        addr
    ))
    .unwrap();
    (client, store)
}

fn temp_file(content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bes-upload-{}.csv", uuid::Uuid::new_v4()));
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_ensure_container_is_idempotent() {
    let (client, store) = mock_store().await;

    client.ensure_container("mycontainer").await.unwrap();
    client.ensure_container("mycontainer").await.unwrap();

    assert_eq!(store.containers.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_upload_overwrites_first() {
    let (client, store) = mock_store().await;
    let path = temp_file("first");

    client.ensure_container("mycontainer").await.unwrap();
    client
        .upload_file(&path, "mycontainer", "newdatadatablob.csv")
        .await
        .unwrap();

    std::fs::write(&path, "second").unwrap();
    client
        .upload_file(&path, "mycontainer", "newdatadatablob.csv")
        .await
        .unwrap();

    let blobs = store.blobs.lock().unwrap().clone();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs["mycontainer/newdatadatablob.csv"], b"second".to_vec());

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_nested_blob_name() {
    let (client, store) = mock_store().await;
    let path = temp_file("a,b\n1,2\n");

    client.ensure_container("data").await.unwrap();
    client
        .upload_file(&path, "data", "2024/run/input.csv")
        .await
        .unwrap();

    assert!(store
        .blobs
        .lock()
        .unwrap()
        .contains_key("data/2024/run/input.csv"));

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_upload_into_missing_container_fails() {
    let (client, _store) = mock_store().await;
    let path = temp_file("x");

    let err = client
        .upload_file(&path, "nowhere", "x.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ApiError { .. }));
    assert!(err.is_not_found());

    std::fs::remove_file(path).ok();
}
