use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    AcceptChangeRequest, ChangeId, CreateRunRequest, CreateRunResponse, HealthResponse,
    ModelsResponse, ProjectsResponse, RunDetail, RunId, RunsResponse, UploadResponse,
};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// ============================================================================
// Transport
// ============================================================================

/// Body of an API request
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized JSON bytes
    Json(Vec<u8>),
    /// Multipart payload; reqwest supplies the boundary-bearing content type
    Multipart(Form),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: RequestBody::Empty,
        }
    }

    pub fn post_json<T: Serialize + ?Sized>(body: &T) -> ClientResult<Self> {
        Ok(Self {
            method: Method::POST,
            body: RequestBody::Json(serde_json::to_vec(body)?),
        })
    }

    pub fn post_multipart(form: Form) -> Self {
        Self {
            method: Method::POST,
            body: RequestBody::Multipart(form),
        }
    }
}

/// Thin request/response wrapper over the dashboard API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, config.api_base.clone()))
    }

    pub fn with_client(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Issue a request and parse the success body as JSON.
    ///
    /// Non-multipart requests are tagged `application/json`. A non-success
    /// status fails with the response body text and is never parsed.
    pub async fn call<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let RequestOptions { method, body } = options;
        debug!(method = %method, path, "api request");

        let mut request = self.http.request(method, self.url(path));
        if !body.is_multipart() {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(bytes) => request.body(bytes),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(path, status = %status, "api request failed");
            return Err(ClientError::from_response(status, &text));
        }

        serde_json::from_str(&text).map_err(|source| ClientError::Decode {
            path: path.to_string(),
            source,
        })
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.call("/health", RequestOptions::get()).await
    }

    pub async fn fetch_models(&self) -> ClientResult<Vec<String>> {
        let data: ModelsResponse = self.call("/models", RequestOptions::get()).await?;
        Ok(data.models)
    }

    pub async fn fetch_projects(&self) -> ClientResult<Vec<String>> {
        let data: ProjectsResponse = self.call("/projects", RequestOptions::get()).await?;
        Ok(data.projects)
    }

    pub async fn fetch_runs(&self) -> ClientResult<RunsResponse> {
        self.call("/runs", RequestOptions::get()).await
    }

    pub async fn fetch_run_detail(&self, run_id: &RunId) -> ClientResult<RunDetail> {
        self.call(&format!("/runs/{run_id}"), RequestOptions::get()).await
    }

    pub async fn create_run(&self, request: &CreateRunRequest) -> ClientResult<CreateRunResponse> {
        self.call("/runs", RequestOptions::post_json(request)?).await
    }

    /// The response payload is implementation-defined; only success matters
    pub async fn accept_change(&self, change_id: &ChangeId) -> ClientResult<serde_json::Value> {
        self.call(
            &format!("/changes/{change_id}/accept"),
            RequestOptions::post_json(&AcceptChangeRequest::accept())?,
        )
        .await
    }

    pub async fn upload_code(
        &self,
        files: &[UploadFile],
        project_name: Option<&str>,
    ) -> ClientResult<UploadResponse> {
        let form = upload_form(files, project_name);
        self.call("/uploads/code", RequestOptions::post_multipart(form)).await
    }
}

// ============================================================================
// Uploads
// ============================================================================

/// A local file staged for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Every file goes under a repeated `files` field; a blank project name is
/// left out entirely
fn upload_form(files: &[UploadFile], project_name: Option<&str>) -> Form {
    let mut form = Form::new();
    for file in files {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        form = form.part("files", part);
    }
    if let Some(name) = project_name.map(str::trim).filter(|name| !name.is_empty()) {
        form = form.text("project_name", name.to_string());
    }
    form
}
