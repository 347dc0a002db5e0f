use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use report_engine::{
    ApiError, EngineEvent, EngineHandle, PagePayload, ReportApi, StartExportRequest,
    StatusPayload,
};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ReportApi for FakeApi {
    async fn get_status(&self) -> Result<StatusPayload, ApiError> {
        self.record("get_status");
        Ok(StatusPayload {
            export_pending: true,
            ..StatusPayload::default()
        })
    }

    async fn start_export(&self, request: &StartExportRequest) -> Result<StatusPayload, ApiError> {
        self.record(format!("start_export:{}", request.root_block_id));
        Ok(StatusPayload::default())
    }

    async fn cancel_export(&self) -> Result<StatusPayload, ApiError> {
        self.record("cancel_export");
        Ok(StatusPayload::default())
    }

    async fn delete_export(&self) -> Result<StatusPayload, ApiError> {
        self.record("delete_export");
        Ok(StatusPayload::default())
    }

    async fn get_result_page(&self, page_index: u32) -> Result<PagePayload, ApiError> {
        self.record(format!("get_result_page:{page_index}"));
        Ok(PagePayload {
            num_results: 0,
            page_size: 10,
            display_data: Vec::new(),
        })
    }

    async fn download_report(&self) -> Result<Vec<u8>, ApiError> {
        self.record("download_report");
        Ok(b"a,b\n1,2\n".to_vec())
    }
}

fn engine(api: Arc<FakeApi>, dir: &TempDir) -> EngineHandle {
    EngineHandle::with_api(api, dir.path().to_path_buf())
}

#[test]
fn status_reply_carries_request_id() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let engine = engine(api.clone(), &temp);

    engine.fetch_status(7);
    let event = engine.recv_timeout(WAIT).expect("status event");
    match event {
        EngineEvent::StatusResolved { request_id, result } => {
            assert_eq!(request_id, 7);
            assert!(result.unwrap().export_pending);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(api.calls(), vec!["get_status".to_string()]);
}

#[test]
fn commands_map_to_handlers() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let engine = engine(api.clone(), &temp);

    engine.start_export(
        1,
        StartExportRequest {
            root_block_id: "root".to_string(),
            ..StartExportRequest::default()
        },
    );
    engine.cancel_export(2);
    engine.delete_export(3);
    engine.fetch_page(4, 2);

    let mut seen = Vec::new();
    for _ in 0..4 {
        match engine.recv_timeout(WAIT).expect("event") {
            EngineEvent::StatusResolved { request_id, .. } => seen.push(request_id),
            EngineEvent::PageResolved {
                request_id, page, ..
            } => {
                assert_eq!(page, 2);
                seen.push(request_id);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4]);

    let mut calls = api.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "cancel_export",
            "delete_export",
            "get_result_page:2",
            "start_export:root",
        ]
    );
}

#[test]
fn poll_fires_once_after_delay() {
    let temp = TempDir::new().unwrap();
    let engine = engine(Arc::new(FakeApi::default()), &temp);

    let started = Instant::now();
    engine.schedule_poll(Duration::from_millis(100));
    let event = engine.recv_timeout(WAIT).expect("poll event");
    assert_eq!(event, EngineEvent::PollDue);
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert!(engine.recv_timeout(Duration::from_millis(200)).is_none());
}

#[test]
fn download_writes_report_csv() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(FakeApi::default());
    let engine = engine(api.clone(), &temp);

    engine.download();
    let path = match engine.recv_timeout(WAIT).expect("download event") {
        EngineEvent::DownloadCompleted { result } => result.expect("saved"),
        other => panic!("unexpected event {other:?}"),
    };
    assert_eq!(path, temp.path().join("report.csv"));
    assert_eq!(fs::read_to_string(path).unwrap(), "a,b\n1,2\n");
    assert_eq!(api.calls(), vec!["download_report".to_string()]);
}
