//! In-process mock of the dashboard API.
//!
//! Records every request, can hold a path's responses behind a gate until the
//! test releases them, can force failures, and applies accept/upload/create
//! mutations to its own state.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use dashboard_client::{ApiClient, Dashboard, MemoryView};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Value,
}

/// Releases responses held by `MockApi::hold`
pub struct Gate(Arc<Semaphore>);

impl Gate {
    /// Let the oldest held response through
    pub fn release(&self) {
        self.0.add_permits(1);
    }

    /// Let every held response through
    pub fn open(&self) {
        self.0.close();
    }
}

#[derive(Default)]
struct MockData {
    models: Vec<String>,
    projects: Vec<String>,
    runs: Vec<Value>,
    details: HashMap<String, Value>,
    next_run_id: u64,
    failures: HashMap<String, (StatusCode, String)>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone, Default)]
pub struct MockApi {
    data: Arc<Mutex<MockData>>,
    gates: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
}

impl MockApi {
    pub fn new() -> Self {
        let mock = Self::default();
        mock.data.lock().unwrap().next_run_id = 100;
        mock
    }

    pub fn with_models(self, models: &[&str]) -> Self {
        self.data.lock().unwrap().models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_projects(self, projects: &[&str]) -> Self {
        self.data.lock().unwrap().projects = projects.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_run(self, id: u64, status: &str, project_path: &str, detail: Value) -> Self {
        {
            let mut data = self.data.lock().unwrap();
            data.runs.push(run_json(id, status, project_path));
            data.details.insert(id.to_string(), detail);
        }
        self
    }

    pub fn set_models(&self, models: &[&str]) {
        self.data.lock().unwrap().models = models.iter().map(|m| m.to_string()).collect();
    }

    pub fn set_detail(&self, id: u64, detail: Value) {
        self.data
            .lock()
            .unwrap()
            .details
            .insert(id.to_string(), detail);
    }

    pub fn add_run(&self, id: u64, status: &str, project_path: &str, detail: Value) {
        let mut data = self.data.lock().unwrap();
        data.runs.insert(0, run_json(id, status, project_path));
        data.details.insert(id.to_string(), detail);
    }

    /// Answer `method path` with `status` and `body` until cleared
    pub fn fail(&self, method: &str, path: &str, status: StatusCode, body: &str) {
        self.data
            .lock()
            .unwrap()
            .failures
            .insert(format!("{method} {path}"), (status, body.to_string()));
    }

    pub fn clear_failure(&self, method: &str, path: &str) {
        self.data
            .lock()
            .unwrap()
            .failures
            .remove(&format!("{method} {path}"));
    }

    /// Hold responses for `method path` until the returned gate lets them go
    pub fn hold(&self, method: &str, path: &str) -> Gate {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), gate.clone());
        Gate(gate)
    }

    /// Stop gating new requests; ones already held stay held
    pub fn unhold(&self, method: &str, path: &str) {
        self.gates
            .lock()
            .unwrap()
            .remove(&format!("{method} {path}"));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.data.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// `method path` of every request, in arrival order
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn projects(&self) -> Vec<String> {
        self.data.lock().unwrap().projects.clone()
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap, body: Value) {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.data.lock().unwrap().requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            content_type,
            body,
        });
    }

    /// Wait at the gate (if any), then report a forced failure (if any)
    async fn admit(&self, method: &str, path: &str) -> Option<Response> {
        let key = format!("{method} {path}");
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let failure = self.data.lock().unwrap().failures.get(&key).cloned();
        failure.map(|(status, body)| (status, body).into_response())
    }
}

pub fn run_json(id: u64, status: &str, project_path: &str) -> Value {
    json!({
        "id": id,
        "project_path": project_path,
        "prompt": "improve things",
        "status": status,
        "created_at": "2024-05-01 10:00:00",
        "updated_at": "2024-05-01 10:00:00"
    })
}

pub fn log_json(kind: &str, message: &str) -> Value {
    json!({"kind": kind, "message": message, "created_at": "2024-05-01 10:00:00"})
}

pub fn change_json(id: u64, file_path: &str, accepted: bool) -> Value {
    json!({
        "id": id,
        "file_path": file_path,
        "diff": format!("--- a/{file_path}\n+++ b/{file_path}\n+change"),
        "accepted": if accepted { 1 } else { 0 }
    })
}

pub fn detail_json(id: u64, status: &str, logs: Vec<Value>, changes: Vec<Value>) -> Value {
    json!({
        "run": run_json(id, status, "/workspace/app"),
        "logs": logs,
        "changes": changes
    })
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_models(State(mock): State<MockApi>, headers: HeaderMap) -> Response {
    mock.record("GET", "/models", &headers, Value::Null);
    if let Some(failure) = mock.admit("GET", "/models").await {
        return failure;
    }
    let models = mock.data.lock().unwrap().models.clone();
    Json(json!({ "models": models })).into_response()
}

async fn list_projects(State(mock): State<MockApi>, headers: HeaderMap) -> Response {
    mock.record("GET", "/projects", &headers, Value::Null);
    if let Some(failure) = mock.admit("GET", "/projects").await {
        return failure;
    }
    let projects = mock.data.lock().unwrap().projects.clone();
    Json(json!({ "projects": projects })).into_response()
}

async fn health(State(mock): State<MockApi>, headers: HeaderMap) -> Response {
    mock.record("GET", "/health", &headers, Value::Null);
    if let Some(failure) = mock.admit("GET", "/health").await {
        return failure;
    }
    Json(json!({ "ok": true })).into_response()
}

async fn list_runs(State(mock): State<MockApi>, headers: HeaderMap) -> Response {
    mock.record("GET", "/runs", &headers, Value::Null);
    let runs = mock.data.lock().unwrap().runs.clone();
    if let Some(failure) = mock.admit("GET", "/runs").await {
        return failure;
    }
    Json(json!({ "runs": runs })).into_response()
}

async fn get_run(
    State(mock): State<MockApi>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/runs/{id}");
    mock.record("GET", &path, &headers, Value::Null);
    // Snapshot on arrival; a held response carries the state it was asked for
    let detail = mock.data.lock().unwrap().details.get(&id).cloned();
    if let Some(failure) = mock.admit("GET", &path).await {
        return failure;
    }
    match detail {
        Some(detail) => Json(detail).into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"detail":"Run not found"}"#).into_response(),
    }
}

async fn create_run(State(mock): State<MockApi>, headers: HeaderMap, body: String) -> Response {
    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    mock.record("POST", "/runs", &headers, payload.clone());
    if let Some(failure) = mock.admit("POST", "/runs").await {
        return failure;
    }

    let mut data = mock.data.lock().unwrap();
    data.next_run_id += 1;
    let id = data.next_run_id;
    let project_path = payload["project_path"].as_str().unwrap_or_default().to_string();
    data.runs.insert(0, run_json(id, "queued", &project_path));
    data.details.insert(
        id.to_string(),
        detail_json(id, "queued", vec![log_json("system", "Run queued")], vec![]),
    );
    Json(json!({ "id": id, "status": "queued" })).into_response()
}

async fn accept_change(
    State(mock): State<MockApi>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = format!("/changes/{id}/accept");
    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    mock.record("POST", &path, &headers, payload.clone());
    if let Some(failure) = mock.admit("POST", &path).await {
        return failure;
    }

    let accepted = payload["accepted"].as_bool().unwrap_or(false);
    let mut data = mock.data.lock().unwrap();
    for detail in data.details.values_mut() {
        if let Some(changes) = detail["changes"].as_array_mut() {
            for change in changes.iter_mut() {
                if change["id"].to_string() == id {
                    change["accepted"] = json!(if accepted { 1 } else { 0 });
                }
            }
        }
    }
    Json(json!({ "ok": true })).into_response()
}

async fn upload_code(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut file_names = Vec::new();
    let mut total_size = 0usize;
    let mut project_name: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("files") => {
                file_names.push(field.file_name().unwrap_or_default().to_string());
                total_size += field.bytes().await.map(|b| b.len()).unwrap_or_default();
            }
            Some("project_name") => {
                project_name = field.text().await.ok();
            }
            _ => {}
        }
    }

    mock.record(
        "POST",
        "/uploads/code",
        &headers,
        json!({ "files": file_names, "project_name": project_name }),
    );
    if let Some(failure) = mock.admit("POST", "/uploads/code").await {
        return failure;
    }

    let project_path = format!(
        "/workspace/{}",
        project_name.clone().unwrap_or_else(|| "upload".to_string())
    );
    let mut data = mock.data.lock().unwrap();
    if !data.projects.contains(&project_path) {
        data.projects.push(project_path.clone());
    }
    Json(json!({
        "count": file_names.len(),
        "total_size": total_size,
        "project_path": project_path
    }))
    .into_response()
}

pub fn router(mock: MockApi) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/models", get(list_models))
        .route("/projects", get(list_projects))
        .route("/runs", get(list_runs).post(create_run))
        .route("/runs/{id}", get(get_run))
        .route("/changes/{id}/accept", post(accept_change))
        .route("/uploads/code", post(upload_code));
    Router::new().nest("/api", api).with_state(mock)
}

// ============================================================================
// Server & client helpers
// ============================================================================

pub struct TestServer {
    pub addr: SocketAddr,
    pub mock: MockApi,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn dashboard(&self) -> (Dashboard, Arc<MemoryView>) {
        let view = Arc::new(MemoryView::new());
        let api = ApiClient::with_client(reqwest::Client::new(), self.api_base());
        (Dashboard::new(api, view.clone()), view)
    }
}

pub async fn start_test_server(mock: MockApi) -> TestServer {
    let app = router(mock.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("Server failed");
    });

    TestServer { addr, mock, handle }
}

/// Poll `condition` until it holds or five seconds pass
pub async fn wait_until<F>(description: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {description}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub async fn with_timeout<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("operation timed out")
}
