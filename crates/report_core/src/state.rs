use std::time::Duration;

use report_logging::{report_debug, report_info};

use crate::page::{PageState, RecordRow};
use crate::view_model::{present_results, AppViewModel, ControlsView};
use crate::{Effect, ResultsEvent};

/// Delay between two status polls while an export is pending.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

pub type RequestId = u64;

/// Snapshot of the server-side export job, replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStatus {
    pub export_pending: bool,
    pub download_url: Option<String>,
    pub last_export_result: Option<ExportResult>,
}

impl JobStatus {
    /// Status synthesized from a failed request so it reconciles like a job error.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            export_pending: false,
            download_url: None,
            last_export_result: Some(ExportResult {
                error: Some(reason.into()),
                ..ExportResult::default()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportResult {
    /// Set when the export failed; no rows exist for a failed export.
    pub error: Option<String>,
    /// Epoch seconds.
    pub start_timestamp: f64,
    pub generation_time_s: f64,
}

/// Filter parameters forwarded untouched to `start_export`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportFilters {
    pub block_types: Vec<String>,
    pub root_block_id: String,
    pub usernames: String,
    pub match_string: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Cancel,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Polling { interval: Duration },
    ActionInFlight { action: Action },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    /// Shown while an export is generating; cleared once results render.
    Progress,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    pub fn progress(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Progress,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ResultsState {
    pub(crate) visible: bool,
    pub(crate) page: PageState,
    pub(crate) rows: Vec<RecordRow>,
    /// True once at least one page has been rendered.
    pub(crate) rendered_once: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    status: Option<JobStatus>,
    filters: ExportFilters,
    in_flight: Option<(Action, RequestId)>,
    polls_in_flight: Vec<RequestId>,
    poll_scheduled: bool,
    spinner: bool,
    message: Option<StatusMessage>,
    results: ResultsState,
    next_request_id: RequestId,
    latest_user_request: RequestId,
    latest_page_request: Option<RequestId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.poll_phase(),
            controls: self.controls(),
            spinner: self.spinner,
            message: self.message.clone(),
            results: present_results(&self.results.page, &self.results.rows, self.results.visible),
            filters: self.filters.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }

    pub fn page(&self) -> &PageState {
        &self.results.page
    }

    pub fn poll_phase(&self) -> PollPhase {
        if let Some((action, _)) = self.in_flight {
            PollPhase::ActionInFlight { action }
        } else if self.poll_scheduled {
            PollPhase::Polling {
                interval: POLL_INTERVAL,
            }
        } else {
            PollPhase::Idle
        }
    }

    pub(crate) fn controls(&self) -> ControlsView {
        if self.in_flight.is_some() {
            return ControlsView::default();
        }
        let pending = self.is_pending();
        let status = self.status.as_ref();
        ControlsView {
            start: !pending,
            cancel: pending,
            download: status.is_some_and(|s| s.download_url.is_some()),
            delete: status.is_some_and(|s| s.last_export_result.is_some()),
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.export_pending)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn filters(&self) -> &ExportFilters {
        &self.filters
    }

    pub(crate) fn filters_mut(&mut self) -> &mut ExportFilters {
        self.dirty = true;
        &mut self.filters
    }

    fn issue_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        self.next_request_id
    }

    /// Status fetch triggered by the user (start-up or refresh).
    pub(crate) fn begin_status_fetch(&mut self) -> RequestId {
        let request_id = self.issue_request_id();
        self.latest_user_request = request_id;
        request_id
    }

    /// Status fetch triggered by the poll timer.
    pub(crate) fn begin_poll(&mut self) -> RequestId {
        self.poll_scheduled = false;
        self.dirty = true;
        let request_id = self.issue_request_id();
        self.polls_in_flight.push(request_id);
        request_id
    }

    /// Forgets `request_id` as an outstanding poll; returns whether it was one.
    pub(crate) fn finish_poll(&mut self, request_id: RequestId) -> bool {
        let before = self.polls_in_flight.len();
        self.polls_in_flight.retain(|id| *id != request_id);
        self.polls_in_flight.len() != before
    }

    /// Disables every action control and shows the spinner until the reply arrives.
    pub(crate) fn begin_action(&mut self, action: Action) -> RequestId {
        let request_id = self.issue_request_id();
        self.latest_user_request = request_id;
        self.in_flight = Some((action, request_id));
        self.spinner = true;
        self.dirty = true;
        request_id
    }

    /// Responses issued before the most recent user request are stale.
    pub(crate) fn is_stale_status(&self, request_id: RequestId) -> bool {
        request_id < self.latest_user_request
    }

    /// Clears the in-flight marker when `request_id` answers the pending command.
    pub(crate) fn finish_action(&mut self, request_id: RequestId) -> bool {
        match self.in_flight {
            Some((_, pending)) if pending == request_id => {
                self.in_flight = None;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Applies a new status and returns whether it differs from the previous one.
    pub(crate) fn replace_status(&mut self, status: JobStatus) -> bool {
        let changed = self.status.as_ref() != Some(&status);
        self.status = Some(status);
        changed
    }

    pub(crate) fn schedule_poll(&mut self, effects: &mut Vec<Effect>) {
        if self.poll_scheduled {
            report_debug!("Poll already scheduled; skipping");
            return;
        }
        self.poll_scheduled = true;
        self.dirty = true;
        effects.push(Effect::SchedulePoll {
            delay: POLL_INTERVAL,
        });
    }

    pub(crate) fn set_spinner(&mut self, on: bool) {
        if self.spinner != on {
            self.spinner = on;
            self.dirty = true;
        }
    }

    pub(crate) fn set_message(&mut self, message: Option<StatusMessage>) {
        if self.message != message {
            self.message = message;
            self.dirty = true;
        }
    }

    pub(crate) fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub(crate) fn hide_results(&mut self, effects: &mut Vec<Effect>) {
        if self.results.visible {
            self.results.visible = false;
            self.dirty = true;
            effects.push(Effect::Results(ResultsEvent::Hidden));
        }
    }

    /// Shows the last rendered page again, if there is one.
    pub(crate) fn reveal_last_results(&mut self, effects: &mut Vec<Effect>) {
        if self.results.rendered_once && !self.results.visible {
            self.results.visible = true;
            self.dirty = true;
            effects.push(Effect::Results(ResultsEvent::Shown));
        }
    }

    pub(crate) fn begin_page_request(&mut self) -> RequestId {
        let request_id = self.issue_request_id();
        self.latest_page_request = Some(request_id);
        request_id
    }

    pub(crate) fn is_current_page_request(&self, request_id: RequestId) -> bool {
        self.latest_page_request == Some(request_id)
    }

    pub(crate) fn finish_page_request(&mut self) {
        self.latest_page_request = None;
    }

    /// Replaces the page and its rows, revealing the table on the first render after a fetch.
    pub(crate) fn render_page(
        &mut self,
        page: PageState,
        rows: Vec<RecordRow>,
        effects: &mut Vec<Effect>,
    ) {
        report_info!(
            "Rendering results page {} of {} ({} rows)",
            page.display_page(),
            page.total_pages(),
            rows.len()
        );
        self.results.page = page;
        self.results.rows = rows;
        self.results.rendered_once = true;
        self.dirty = true;
        if !self.results.visible {
            self.results.visible = true;
            effects.push(Effect::Results(ResultsEvent::Shown));
        }
        effects.push(Effect::Results(ResultsEvent::Rendered));
    }
}
