//! Wire types shared between the run dashboard client and the dashboard API
//!
//! The API is an external collaborator; these types describe exactly what the
//! client sends and what it is prepared to accept. Decoding is tolerant where
//! the server is known to be loose:
//! - row ids arrive as JSON numbers but are treated as opaque strings
//! - `accepted` arrives as `0/1` from the server's SQLite rows
//! - unknown fields are ignored everywhere

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Raw id representation accepted on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Text(String),
}

impl From<IdRepr> for String {
    fn from(repr: IdRepr) -> Self {
        match repr {
            IdRepr::Int(value) => value.to_string(),
            IdRepr::Text(value) => value,
        }
    }
}

/// Opaque run identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IdRepr::deserialize(deserializer).map(|repr| Self(repr.into()))
    }
}

/// Opaque change-record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChangeId(pub String);

impl ChangeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChangeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IdRepr::deserialize(deserializer).map(|repr| Self(repr.into()))
    }
}

fn bool_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

// ============================================================================
// Directory
// ============================================================================

/// GET /models
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<String>,
}

/// GET /projects
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub projects: Vec<String>,
}

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub ok: bool,
}

// ============================================================================
// Runs
// ============================================================================

/// One row of GET /runs. `status` is an open set decided by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub id: RunId,
    pub status: String,
    pub project_path: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// GET /runs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunsResponse {
    #[serde(default)]
    pub runs: Vec<RunSummary>,
}

/// Streamed log line of a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub created_at: String,
    pub kind: String,
    pub message: String,
}

/// Proposed file change produced by a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeRecord {
    pub id: ChangeId,
    pub file_path: String,
    pub diff: String,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub accepted: bool,
}

/// GET /runs/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunDetail {
    #[serde(default)]
    pub run: Option<RunSummary>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub changes: Vec<ChangeRecord>,
}

/// POST /runs
///
/// `None` models serialize as `null`: "no preference" is not the same thing
/// as a model named by the empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRunRequest {
    pub project_path: String,
    pub prompt: String,
    pub fast_model: Option<String>,
    pub deep_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRunResponse {
    pub id: RunId,
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// Changes & Uploads
// ============================================================================

/// POST /changes/{id}/accept
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptChangeRequest {
    pub accepted: bool,
}

impl AcceptChangeRequest {
    pub fn accept() -> Self {
        Self { accepted: true }
    }
}

/// POST /uploads/code. The server answers with either the batch shape or,
/// for single-file uploads on older servers, the per-file shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UploadResponse {
    Batch {
        count: u64,
        total_size: u64,
        project_path: String,
    },
    Single {
        filename: String,
        size: u64,
        project_path: String,
    },
}

impl UploadResponse {
    pub fn project_path(&self) -> &str {
        match self {
            Self::Batch { project_path, .. } | Self::Single { project_path, .. } => project_path,
        }
    }

    pub fn file_count(&self) -> u64 {
        match self {
            Self::Batch { count, .. } => *count,
            Self::Single { .. } => 1,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        match self {
            Self::Batch { total_size, .. } => *total_size,
            Self::Single { size, .. } => *size,
        }
    }
}
