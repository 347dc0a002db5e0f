//! Report engine: HTTP plumbing for the export handlers and effect execution.
mod client;
mod endpoints;
mod engine;
mod persist;
mod types;

/// Correlates a reply with the request that produced it.
pub type RequestId = u64;

pub use client::{ApiSettings, ReportApi, ReqwestReportApi};
pub use endpoints::{EndpointResolver, Handler, HandlerUrlResolver};
pub use engine::{EngineConfig, EngineHandle};
pub use persist::{save_report, AtomicFileWriter, PersistError, REPORT_FILENAME};
pub use types::{
    ApiError, EngineEvent, ExportResultPayload, FailureKind, PagePayload, PageRequest, RowPayload,
    StartExportRequest, StatusPayload,
};
