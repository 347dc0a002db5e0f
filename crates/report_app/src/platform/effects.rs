use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use report_core::{Effect, ExportResult, JobStatus, Msg, PageResponse, RecordRow};
use report_engine::{
    EngineConfig, EngineEvent, EngineHandle, ExportResultPayload, HandlerUrlResolver, PagePayload,
    RowPayload, StartExportRequest, StatusPayload,
};
use report_logging::{report_debug, report_info, report_warn};

use super::app::ShellEvent;
use super::config::ClientConfig;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: &ClientConfig, tx: mpsc::Sender<ShellEvent>) -> anyhow::Result<Self> {
        let resolver = HandlerUrlResolver::new(&config.base_url, &config.handler_prefix)?;
        let engine = EngineHandle::new(EngineConfig {
            settings: config.api_settings(),
            resolver: Arc::new(resolver),
            download_dir: config.download_dir.clone(),
        })?;
        let runner = Self { engine };
        runner.spawn_event_loop(tx);
        Ok(runner)
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchStatus { request_id } => {
                    report_debug!("FetchStatus request_id={}", request_id);
                    self.engine.fetch_status(request_id);
                }
                Effect::StartExport {
                    request_id,
                    filters,
                } => {
                    report_info!(
                        "StartExport request_id={} block_types={:?} root={:?}",
                        request_id,
                        filters.block_types,
                        filters.root_block_id
                    );
                    self.engine.start_export(
                        request_id,
                        StartExportRequest {
                            block_types: filters.block_types,
                            root_block_id: filters.root_block_id,
                            usernames: filters.usernames,
                            match_string: filters.match_string,
                        },
                    );
                }
                Effect::CancelExport { request_id } => {
                    report_info!("CancelExport request_id={}", request_id);
                    self.engine.cancel_export(request_id);
                }
                Effect::DeleteExport { request_id } => {
                    report_info!("DeleteExport request_id={}", request_id);
                    self.engine.delete_export(request_id);
                }
                Effect::SchedulePoll { delay } => {
                    report_debug!("SchedulePoll in {:?}", delay);
                    self.engine.schedule_poll(delay);
                }
                Effect::FetchPage { request_id, page } => {
                    report_info!("FetchPage request_id={} page={}", request_id, page);
                    self.engine.fetch_page(request_id, page);
                }
                Effect::DownloadReport => {
                    report_info!("DownloadReport");
                    self.engine.download();
                }
                Effect::Results(event) => {
                    report_debug!("Results table {:?}", event);
                }
            }
        }
    }

    fn spawn_event_loop(&self, tx: mpsc::Sender<ShellEvent>) {
        let engine = self.engine.clone();
        thread::spawn(move || {
            while let Some(event) = engine.recv() {
                if tx.send(ShellEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StatusResolved { request_id, result } => Msg::StatusReceived {
            request_id,
            result: result.map(map_status).map_err(|err| {
                report_warn!("Request {} failed: {}", request_id, err);
                err.raw_body()
            }),
        },
        EngineEvent::PageResolved {
            request_id,
            page,
            result,
        } => Msg::PageReceived {
            request_id,
            page,
            result: result.map(map_page).map_err(|err| {
                report_warn!("Page request {} failed: {}", request_id, err);
                err.raw_body()
            }),
        },
        EngineEvent::PollDue => Msg::PollTimerFired,
        EngineEvent::DownloadCompleted { result } => {
            Msg::DownloadFinished(result.map(|path| path.display().to_string()))
        }
    }
}

fn map_status(payload: StatusPayload) -> JobStatus {
    JobStatus {
        export_pending: payload.export_pending,
        download_url: payload.download_url,
        last_export_result: payload.last_export_result.map(map_result),
    }
}

fn map_result(payload: ExportResultPayload) -> ExportResult {
    ExportResult {
        error: payload.error,
        start_timestamp: payload.start_timestamp.unwrap_or_default(),
        generation_time_s: payload.generation_time_s.unwrap_or_default(),
    }
}

fn map_page(payload: PagePayload) -> PageResponse {
    PageResponse {
        num_results: payload.num_results,
        page_size: payload.page_size,
        rows: payload.display_data.into_iter().map(map_row).collect(),
    }
}

fn map_row(row: RowPayload) -> RecordRow {
    RecordRow {
        section: row.section.unwrap_or_default(),
        subsection: row.subsection.unwrap_or_default(),
        unit: row.unit.unwrap_or_default(),
        block_type: row.block_type.unwrap_or_default(),
        question: row.question.unwrap_or_default(),
        answer: row.answer.unwrap_or_default(),
        username: row.username.unwrap_or_default(),
    }
}
