use crate::{ExportFilters, PageState, PollPhase, RecordRow, StatusMessage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: PollPhase,
    pub controls: ControlsView,
    pub spinner: bool,
    pub message: Option<StatusMessage>,
    pub results: ResultsView,
    pub filters: ExportFilters,
    pub dirty: bool,
}

/// Enablement of the four action controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsView {
    pub start: bool,
    pub cancel: bool,
    pub download: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsView {
    pub visible: bool,
    pub rows: Vec<RecordRow>,
    pub page_label: u32,
    pub total_pages_label: u32,
    pub num_results: u64,
    /// First and previous buttons.
    pub back_enabled: bool,
    /// Next and last buttons.
    pub forward_enabled: bool,
}

/// Builds the results table view from the current page and its rows.
pub fn present_results(page: &PageState, rows: &[RecordRow], visible: bool) -> ResultsView {
    ResultsView {
        visible,
        rows: rows.to_vec(),
        page_label: page.display_page(),
        total_pages_label: page.total_pages(),
        num_results: page.num_results(),
        back_enabled: page.can_go_back(),
        forward_enabled: page.can_go_forward(),
    }
}
