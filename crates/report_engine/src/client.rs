use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use report_logging::{report_debug, report_warn};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::endpoints::{EndpointResolver, Handler};
use crate::{
    ApiError, FailureKind, PagePayload, PageRequest, StartExportRequest, StatusPayload,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_download_bytes: 64 * 1024 * 1024,
        }
    }
}

/// The export handlers of the server, one call per request.
#[async_trait::async_trait]
pub trait ReportApi: Send + Sync {
    async fn get_status(&self) -> Result<StatusPayload, ApiError>;

    async fn start_export(&self, request: &StartExportRequest) -> Result<StatusPayload, ApiError>;

    async fn cancel_export(&self) -> Result<StatusPayload, ApiError>;

    async fn delete_export(&self) -> Result<StatusPayload, ApiError>;

    async fn get_result_page(&self, page_index: u32) -> Result<PagePayload, ApiError>;

    /// Fetches the finished CSV report.
    async fn download_report(&self) -> Result<Vec<u8>, ApiError>;
}

#[derive(Clone)]
pub struct ReqwestReportApi {
    client: reqwest::Client,
    resolver: Arc<dyn EndpointResolver>,
    settings: ApiSettings,
}

impl ReqwestReportApi {
    pub fn new(settings: ApiSettings, resolver: Arc<dyn EndpointResolver>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            resolver,
            settings,
        })
    }

    async fn post<T: DeserializeOwned>(&self, handler: Handler, body: String) -> Result<T, ApiError> {
        let url = self.resolver.resolve(handler)?;
        report_debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            report_warn!("{} answered {}", handler.name(), status);
            let message = if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            };
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        serde_json::from_str(&text).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ReportApi for ReqwestReportApi {
    async fn get_status(&self) -> Result<StatusPayload, ApiError> {
        self.post(Handler::GetStatus, empty_body()).await
    }

    async fn start_export(&self, request: &StartExportRequest) -> Result<StatusPayload, ApiError> {
        self.post(Handler::StartExport, encode(request)?).await
    }

    async fn cancel_export(&self) -> Result<StatusPayload, ApiError> {
        self.post(Handler::CancelExport, empty_body()).await
    }

    async fn delete_export(&self) -> Result<StatusPayload, ApiError> {
        self.post(Handler::DeleteExport, empty_body()).await
    }

    async fn get_result_page(&self, page_index: u32) -> Result<PagePayload, ApiError> {
        // The handler expects a JSON string whose content is the encoded parameters.
        let params = encode(&PageRequest::new(page_index))?;
        let page: PagePayload = self.post(Handler::GetResultPage, encode(&params)?).await?;
        if page.page_size == 0 {
            return Err(ApiError::new(
                FailureKind::Protocol,
                "page_size must be positive",
            ));
        }
        Ok(page)
    }

    async fn download_report(&self) -> Result<Vec<u8>, ApiError> {
        let url = self.resolver.resolve(Handler::DownloadReport)?;
        report_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_download_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(ApiError::new(
                FailureKind::TooLarge { max_bytes },
                "report too large",
            ));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge { max_bytes },
                    "report too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn empty_body() -> String {
    "{}".to_string()
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|err| ApiError::new(FailureKind::Protocol, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
