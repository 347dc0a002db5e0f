//! Report core: pure export-status state machine, pagination and view-model helpers.
mod effect;
mod msg;
pub mod notify;
mod page;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ResultsEvent};
pub use msg::Msg;
pub use page::{total_pages, PageResponse, PageState, RecordRow};
pub use state::{
    Action, AppState, ExportFilters, ExportResult, JobStatus, MessageKind, PollPhase, RequestId,
    StatusMessage, POLL_INTERVAL,
};
pub use update::update;
pub use view_model::{present_results, AppViewModel, ControlsView, ResultsView};
