use url::Url;

use crate::{ApiError, FailureKind};

/// Server handlers the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    GetStatus,
    StartExport,
    CancelExport,
    DeleteExport,
    GetResultPage,
    DownloadReport,
}

impl Handler {
    pub fn name(self) -> &'static str {
        match self {
            Handler::GetStatus => "get_status",
            Handler::StartExport => "start_export",
            Handler::CancelExport => "cancel_export",
            Handler::DeleteExport => "delete_export",
            Handler::GetResultPage => "get_result_page",
            Handler::DownloadReport => "download_report",
        }
    }
}

/// Maps handler names to absolute URLs; hosts may plug in their own scheme.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self, handler: Handler) -> Result<Url, ApiError>;
}

/// Resolves `<base_url>/<prefix>/<handler>`.
#[derive(Debug, Clone)]
pub struct HandlerUrlResolver {
    base: Url,
    prefix: String,
}

impl HandlerUrlResolver {
    pub fn new(base_url: &str, prefix: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            prefix: prefix.trim_matches('/').to_string(),
        })
    }

    fn join(&self, relative: &str) -> Result<Url, ApiError> {
        self.base
            .join(relative)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

impl EndpointResolver for HandlerUrlResolver {
    fn resolve(&self, handler: Handler) -> Result<Url, ApiError> {
        if self.prefix.is_empty() {
            self.join(handler.name())
        } else {
            self.join(&format!("{}/{}", self.prefix, handler.name()))
        }
    }
}
