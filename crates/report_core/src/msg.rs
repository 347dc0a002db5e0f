use crate::{JobStatus, PageResponse, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Host shell finished setting up; fetch the current status once.
    Initialized,
    /// User asked for a fresh status fetch.
    RefreshClicked,
    /// Block-type multi-select changed.
    BlockTypesSelected(Vec<String>),
    RootBlockChanged(String),
    /// Free-text username list, forwarded as typed.
    UsernamesChanged(String),
    MatchStringChanged(String),
    StartClicked,
    CancelClicked,
    DeleteClicked,
    DownloadClicked,
    FirstPageClicked,
    PreviousPageClicked,
    NextPageClicked,
    LastPageClicked,
    /// The scheduled re-poll is due.
    PollTimerFired,
    /// Reply to a status fetch or a start/cancel/delete command.
    /// `Err` carries the raw failure body.
    StatusReceived {
        request_id: RequestId,
        result: Result<JobStatus, String>,
    },
    /// Reply to a page fetch.
    PageReceived {
        request_id: RequestId,
        page: u32,
        result: Result<PageResponse, String>,
    },
    /// The report download finished; `Ok` carries where it was saved.
    DownloadFinished(Result<String, String>),
    /// Render tick; no state change.
    Tick,
    NoOp,
}
