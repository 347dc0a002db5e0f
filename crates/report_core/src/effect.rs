use std::time::Duration;

use crate::{ExportFilters, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchStatus { request_id: RequestId },
    StartExport {
        request_id: RequestId,
        filters: ExportFilters,
    },
    CancelExport { request_id: RequestId },
    DeleteExport { request_id: RequestId },
    /// Deliver `Msg::PollTimerFired` once after `delay`.
    SchedulePoll { delay: Duration },
    FetchPage { request_id: RequestId, page: u32 },
    /// Save the report served by the `download_report` handler.
    DownloadReport,
    Results(ResultsEvent),
}

/// Lifecycle signals of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsEvent {
    Shown,
    Hidden,
    Rendered,
}
