use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use report_logging::{report_debug, report_info, report_warn};

use crate::client::{ApiSettings, ReportApi, ReqwestReportApi};
use crate::endpoints::EndpointResolver;
use crate::persist::save_report;
use crate::{ApiError, EngineEvent, RequestId, StartExportRequest};

enum EngineCommand {
    FetchStatus { request_id: RequestId },
    StartExport {
        request_id: RequestId,
        request: StartExportRequest,
    },
    CancelExport { request_id: RequestId },
    DeleteExport { request_id: RequestId },
    FetchPage { request_id: RequestId, page: u32 },
    SchedulePoll { delay: Duration },
    Download,
}

pub struct EngineConfig {
    pub settings: ApiSettings,
    pub resolver: Arc<dyn EndpointResolver>,
    pub download_dir: PathBuf,
}

/// Runs requests on a background tokio runtime and reports back through a channel.
///
/// Requests run concurrently; replies arrive in completion order.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let api = ReqwestReportApi::new(config.settings, config.resolver)?;
        Ok(Self::with_api(Arc::new(api), config.download_dir))
    }

    pub fn with_api(api: Arc<dyn ReportApi>, download_dir: PathBuf) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let download_dir = Arc::new(download_dir);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                let download_dir = download_dir.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), &download_dir, command, event_tx).await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn fetch_status(&self, request_id: RequestId) {
        self.send(EngineCommand::FetchStatus { request_id });
    }

    pub fn start_export(&self, request_id: RequestId, request: StartExportRequest) {
        self.send(EngineCommand::StartExport {
            request_id,
            request,
        });
    }

    pub fn cancel_export(&self, request_id: RequestId) {
        self.send(EngineCommand::CancelExport { request_id });
    }

    pub fn delete_export(&self, request_id: RequestId) {
        self.send(EngineCommand::DeleteExport { request_id });
    }

    pub fn fetch_page(&self, request_id: RequestId, page: u32) {
        self.send(EngineCommand::FetchPage { request_id, page });
    }

    /// Emits `EngineEvent::PollDue` once after `delay`. Cannot be cancelled.
    pub fn schedule_poll(&self, delay: Duration) {
        self.send(EngineCommand::SchedulePoll { delay });
    }

    pub fn download(&self) {
        self.send(EngineCommand::Download);
    }

    /// Blocks for the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            report_warn!("Engine thread stopped; command dropped");
        }
    }
}

async fn handle_command(
    api: &dyn ReportApi,
    download_dir: &Path,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchStatus { request_id } => EngineEvent::StatusResolved {
            request_id,
            result: api.get_status().await,
        },
        EngineCommand::StartExport {
            request_id,
            request,
        } => EngineEvent::StatusResolved {
            request_id,
            result: api.start_export(&request).await,
        },
        EngineCommand::CancelExport { request_id } => EngineEvent::StatusResolved {
            request_id,
            result: api.cancel_export().await,
        },
        EngineCommand::DeleteExport { request_id } => EngineEvent::StatusResolved {
            request_id,
            result: api.delete_export().await,
        },
        EngineCommand::FetchPage { request_id, page } => EngineEvent::PageResolved {
            request_id,
            page,
            result: api.get_result_page(page).await,
        },
        EngineCommand::SchedulePoll { delay } => {
            tokio::time::sleep(delay).await;
            report_debug!("Poll due after {:?}", delay);
            EngineEvent::PollDue
        }
        EngineCommand::Download => EngineEvent::DownloadCompleted {
            result: download(api, download_dir).await,
        },
    };
    let _ = event_tx.send(event);
}

async fn download(api: &dyn ReportApi, dir: &Path) -> Result<PathBuf, String> {
    let bytes = api
        .download_report()
        .await
        .map_err(|err| err.raw_body())?;
    let path = save_report(dir, &bytes).map_err(|err| err.to_string())?;
    report_info!("Saved report ({} bytes) to {:?}", bytes.len(), path);
    Ok(path)
}
