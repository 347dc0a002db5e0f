use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RequestId;

/// Body of every status-producing handler.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub export_pending: bool,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub last_export_result: Option<ExportResultPayload>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ExportResultPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub start_timestamp: Option<f64>,
    #[serde(default)]
    pub generation_time_s: Option<f64>,
}

/// Body of `start_export`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StartExportRequest {
    pub block_types: Vec<String>,
    pub root_block_id: String,
    pub usernames: String,
    pub match_string: String,
}

/// Pagination parameters of `get_result_page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page_index: u32,
    /// Results are never re-sorted client-side.
    pub order: Option<String>,
}

impl PageRequest {
    pub fn new(page_index: u32) -> Self {
        Self {
            page_index,
            order: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagePayload {
    pub num_results: u64,
    pub page_size: u32,
    #[serde(default)]
    pub display_data: Vec<RowPayload>,
}

/// One result row; accepted either as a 7-element array or as an object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RowPayload {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub subsection: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(rename = "type", default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StatusResolved {
        request_id: RequestId,
        result: Result<StatusPayload, ApiError>,
    },
    PageResolved {
        request_id: RequestId,
        page: u32,
        result: Result<PagePayload, ApiError>,
    },
    /// A scheduled poll delay elapsed.
    PollDue,
    DownloadCompleted {
        result: Result<std::path::PathBuf, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure text for the user: the handler's response body when there is one.
    pub fn raw_body(&self) -> String {
        match self.kind {
            FailureKind::HttpStatus(_) => self.message.clone(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Response body was not the expected JSON.
    Decode,
    /// JSON was well-formed but violated the protocol.
    Protocol,
    TooLarge { max_bytes: u64 },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Protocol => write!(f, "protocol violation"),
            FailureKind::TooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
        }
    }
}
