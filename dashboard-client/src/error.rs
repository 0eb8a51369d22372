//! Error types for the dashboard client

use std::path::PathBuf;

use reqwest::StatusCode;

/// Every failure the reconciliation core can report
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response; `message` is the body text, or a generic line when
    /// the body was blank
    #[error("{message}")]
    Request { status: StatusCode, message: String },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body that is not the JSON the endpoint promises
    #[error("failed to parse JSON from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized
    #[error("failed to serialize request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Local validation failure; no request was issued
    #[error("{0}")]
    Validation(String),

    /// Reading a local file for upload failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Build the failure for a non-success status and its body text
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed ({})", status.as_u16())
        } else {
            body.to_string()
        };
        Self::Request { status, message }
    }

    /// Text surfaced inline next to the action that failed
    pub fn user_message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
