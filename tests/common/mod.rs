//! Purpose: In-process mock of the document library API for integration tests.
//! Exports: `MockServer`, `UploadRecord`, `seed_document`, `closed_port_url`, `TestResult`.
//! Role: Serve the JSON/multipart routes on a loopback port from a dedicated runtime thread,
//!       so both async client tests and blocking CLI tests can use it.
//! Invariants: Every request line (`METHOD /path?query`) is recorded in arrival order.
//! Invariants: Ids `broken` and `garbled` answer with a non-JSON 500 and a non-JSON 200.
#![allow(dead_code)]

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

const ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/plain",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadRecord {
    pub file_name: String,
    pub mime_type: String,
    pub size: usize,
    pub title: String,
    pub authors: String,
    pub tags: String,
}

#[derive(Default)]
struct MockState {
    documents: Vec<Value>,
    requests: Vec<String>,
    content_types: Vec<String>,
    uploads: Vec<UploadRecord>,
    next_id: u64,
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poison| poison.into_inner())
}

pub struct MockServer {
    pub base_url: String,
    state: Shared,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub fn start() -> TestResult<Self> {
        Self::start_with(Vec::new())
    }

    pub fn start_with(documents: Vec<Value>) -> TestResult<Self> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(MockState {
            documents,
            ..MockState::default()
        }));
        let app = router(state.clone());
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        std::thread::spawn(move || {
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown),
        })
    }

    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }

    pub fn content_types(&self) -> Vec<String> {
        lock(&self.state).content_types.clone()
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        lock(&self.state).uploads.clone()
    }

    pub fn documents(&self) -> Vec<Value> {
        lock(&self.state).documents.clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub fn seed_document(id: &str, title: &str, content: &str, tags: &[&str]) -> Value {
    json!({
        "_id": id,
        "title": title,
        "content": content,
        "authors": ["Ada Lovelace"],
        "tags": tags,
        "upload_date": "2024-01-05T14:30:00",
        "metadata": {}
    })
}

/// A loopback url nothing is listening on.
pub fn closed_port_url() -> TestResult<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/search/", get(search))
        .route("/documents/", get(list_documents).post(create_document))
        .route("/documents/upload", post(upload_document))
        .route(
            "/documents/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    {
        let mut guard = lock(&state);
        guard
            .requests
            .push(format!("{} {}", request.method(), request.uri()));
        if let Some(content_type) = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            guard.content_types.push(content_type.to_string());
        }
    }
    next.run(request).await
}

fn detail(status: StatusCode, detail: Value) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn not_found() -> Response {
    detail(StatusCode::NOT_FOUND, json!("Document not found"))
}

fn split(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn text_of(document: &Value, field: &str) -> String {
    document[field].as_str().unwrap_or_default().to_lowercase()
}

async fn search(State(state): State<Shared>, Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("q").cloned().unwrap_or_default();
    if query == "fail" {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))).into_response();
    }
    let limit = params
        .get("limit")
        .and_then(|limit| limit.parse::<usize>().ok())
        .unwrap_or(20);
    let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    let guard = lock(&state);
    let results: Vec<Value> = guard
        .documents
        .iter()
        .filter(|doc| {
            let haystack = format!("{} {}", text_of(doc, "title"), text_of(doc, "content"));
            words.iter().any(|word| haystack.contains(word.as_str()))
        })
        .take(limit)
        .enumerate()
        .map(|(idx, doc)| {
            json!({
                "text": doc["content"],
                "score": 0.92 - 0.11 * idx as f64,
                "title": doc["title"],
                "authors": doc["authors"],
                "tags": doc["tags"],
                "upload_date": doc["upload_date"],
            })
        })
        .collect();
    Json(results).into_response()
}

async fn list_documents(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let skip = params
        .get("skip")
        .and_then(|skip| skip.parse::<usize>().ok())
        .unwrap_or(0);
    let limit = params
        .get("limit")
        .and_then(|limit| limit.parse::<usize>().ok())
        .unwrap_or(50);
    let wanted = params.get("tags").map(|tags| split(tags)).unwrap_or_default();
    let guard = lock(&state);
    let documents: Vec<Value> = guard
        .documents
        .iter()
        .filter(|doc| {
            wanted.is_empty()
                || doc["tags"]
                    .as_array()
                    .is_some_and(|tags| tags.iter().any(|tag| wanted.iter().any(|w| tag == w.as_str())))
        })
        .skip(skip)
        .take(limit)
        .cloned()
        .collect();
    Json(documents).into_response()
}

async fn get_document(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    match id.as_str() {
        "broken" => return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        "garbled" => return (StatusCode::OK, "not json").into_response(),
        _ => {}
    }
    let guard = lock(&state);
    match guard.documents.iter().find(|doc| doc["_id"] == id.as_str()) {
        Some(doc) => Json(doc.clone()).into_response(),
        None => not_found(),
    }
}

async fn create_document(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let title = body["title"].as_str().unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([{ "loc": ["body", "title"], "msg": "field required" }]),
        );
    }
    let mut guard = lock(&state);
    guard.next_id += 1;
    let id = format!("doc-{}", guard.next_id);
    let document = json!({
        "_id": id,
        "title": title,
        "content": body["content"],
        "authors": body["authors"],
        "tags": body["tags"],
        "upload_date": "2024-02-01T08:00:00",
        "metadata": body.get("metadata").cloned().unwrap_or_else(|| json!({})),
    });
    guard.documents.insert(0, document.clone());
    Json(document).into_response()
}

async fn upload_document(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut record = UploadRecord::default();
    let mut content = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return detail(StatusCode::BAD_REQUEST, json!(err.to_string())),
        };
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            record.file_name = field.file_name().unwrap_or_default().to_string();
            record.mime_type = field.content_type().unwrap_or_default().to_string();
        }
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return detail(StatusCode::BAD_REQUEST, json!(err.to_string())),
        };
        let text = String::from_utf8_lossy(&bytes).into_owned();
        match name.as_str() {
            "file" => {
                record.size = bytes.len();
                content = bytes.to_vec();
            }
            "title" => record.title = text,
            "authors" => record.authors = text,
            "tags" => record.tags = text,
            _ => {}
        }
    }
    if !ALLOWED_TYPES.contains(&record.mime_type.as_str()) {
        return detail(StatusCode::BAD_REQUEST, json!("Unsupported file type"));
    }

    let mut guard = lock(&state);
    guard.next_id += 1;
    let document = json!({
        "_id": format!("upload-{}", guard.next_id),
        "title": record.title,
        "content": String::from_utf8_lossy(&content),
        "authors": split(&record.authors),
        "tags": split(&record.tags),
        "upload_date": "2024-02-01T08:00:00",
        "metadata": {
            "original_filename": record.file_name,
            "file_size": record.size,
            "file_type": record.mime_type,
        },
    });
    guard.uploads.push(record);
    guard.documents.insert(0, document.clone());
    Json(document).into_response()
}

async fn update_document(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut guard = lock(&state);
    let Some(doc) = guard.documents.iter_mut().find(|doc| doc["_id"] == id.as_str()) else {
        return not_found();
    };
    for field in ["title", "authors", "tags", "content"] {
        if let Some(value) = body.get(field).filter(|value| !value.is_null()) {
            doc[field] = value.clone();
        }
    }
    Json(doc.clone()).into_response()
}

async fn delete_document(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut guard = lock(&state);
    let before = guard.documents.len();
    guard.documents.retain(|doc| doc["_id"] != id.as_str());
    if guard.documents.len() == before {
        return not_found();
    }
    Json(json!({ "message": "Document deleted successfully" })).into_response()
}
