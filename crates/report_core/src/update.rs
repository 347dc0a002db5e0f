use report_logging::{report_debug, report_info, report_warn};

use crate::notify;
use crate::{
    Action, AppState, Effect, JobStatus, MessageKind, Msg, PageResponse, PageState, RequestId,
    StatusMessage,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Msg::Initialized | Msg::RefreshClicked => {
            let request_id = state.begin_status_fetch();
            effects.push(Effect::FetchStatus { request_id });
        }
        Msg::BlockTypesSelected(block_types) => state.filters_mut().block_types = block_types,
        Msg::RootBlockChanged(root) => state.filters_mut().root_block_id = root,
        Msg::UsernamesChanged(usernames) => state.filters_mut().usernames = usernames,
        Msg::MatchStringChanged(pattern) => state.filters_mut().match_string = pattern,
        Msg::StartClicked => {
            if state.controls().start {
                state.hide_results(&mut effects);
                let request_id = state.begin_action(Action::Start);
                effects.push(Effect::StartExport {
                    request_id,
                    filters: state.filters().clone(),
                });
            }
        }
        Msg::CancelClicked => {
            if state.controls().cancel {
                // Cancelling goes back to the previous results.
                state.reveal_last_results(&mut effects);
                let request_id = state.begin_action(Action::Cancel);
                effects.push(Effect::CancelExport { request_id });
            }
        }
        Msg::DeleteClicked => {
            if state.controls().delete {
                state.hide_results(&mut effects);
                let request_id = state.begin_action(Action::Delete);
                effects.push(Effect::DeleteExport { request_id });
            }
        }
        Msg::DownloadClicked => {
            if state.controls().download {
                effects.push(Effect::DownloadReport);
            }
        }
        Msg::FirstPageClicked => {
            let target = state.page().first();
            request_page(&mut state, target, &mut effects);
        }
        Msg::PreviousPageClicked => {
            let target = state.page().previous();
            request_page(&mut state, target, &mut effects);
        }
        Msg::NextPageClicked => {
            let target = state.page().next();
            request_page(&mut state, target, &mut effects);
        }
        Msg::LastPageClicked => {
            let target = state.page().last();
            request_page(&mut state, target, &mut effects);
        }
        Msg::PollTimerFired => {
            let request_id = state.begin_poll();
            effects.push(Effect::FetchStatus { request_id });
        }
        Msg::StatusReceived { request_id, result } => {
            apply_status_reply(&mut state, request_id, result, &mut effects);
        }
        Msg::PageReceived {
            request_id,
            page,
            result,
        } => apply_page_reply(&mut state, request_id, page, result, &mut effects),
        Msg::DownloadFinished(result) => {
            let message = match result {
                Ok(path) => StatusMessage::info(notify::download_saved(&path)),
                Err(reason) => StatusMessage::error(notify::download_failed(&reason)),
            };
            state.set_message(Some(message));
        }
        Msg::Tick | Msg::NoOp => {}
    }

    (state, effects)
}

fn request_page(state: &mut AppState, target: Option<u32>, effects: &mut Vec<Effect>) {
    let Some(page) = target else {
        report_debug!("Page navigation ignored at boundary");
        return;
    };
    let request_id = state.begin_page_request();
    effects.push(Effect::FetchPage { request_id, page });
}

fn apply_status_reply(
    state: &mut AppState,
    request_id: RequestId,
    result: Result<JobStatus, String>,
    effects: &mut Vec<Effect>,
) {
    // The command is answered even when a newer request makes the reply stale.
    let was_action = state.finish_action(request_id);
    let was_poll = state.finish_poll(request_id);
    if state.is_stale_status(request_id) {
        report_info!("Discarding stale status reply for request {}", request_id);
        if was_action {
            let pending = state.is_pending();
            state.set_spinner(pending);
        }
        return;
    }
    let status = match result {
        Ok(status) => status,
        Err(body) if was_poll => {
            report_warn!("Poll {} failed, polling stops: {}", request_id, body);
            return;
        }
        Err(body) => {
            report_warn!("Status request {} failed: {}", request_id, body);
            JobStatus::failed(body)
        }
    };
    let changed = reconcile(state, status, effects);
    if was_action && !changed {
        // Nothing new to show; only the action spinner has to go.
        let pending = state.is_pending();
        state.set_spinner(pending);
    }
}

/// Maps a freshly received status onto UI effects. Returns whether it changed.
fn reconcile(state: &mut AppState, status: JobStatus, effects: &mut Vec<Effect>) -> bool {
    if status.export_pending {
        state.schedule_poll(effects);
    }
    let changed = state.replace_status(status.clone());
    if !changed {
        return false;
    }
    state.mark_dirty();

    match &status.last_export_result {
        Some(result) => match &result.error {
            Some(error) => {
                state.hide_results(effects);
                state.set_spinner(false);
                state.set_message(Some(StatusMessage::error(notify::export_failed(error))));
            }
            None => {
                state.set_message(Some(StatusMessage::info(notify::results_retrieved(
                    result,
                ))));
                request_page(state, Some(1), effects);
            }
        },
        None if !status.export_pending => {
            state.set_spinner(false);
            state.set_message(None);
        }
        None => {}
    }

    if status.export_pending {
        state.set_spinner(true);
        state.set_message(Some(StatusMessage::progress(notify::GENERATING_MESSAGE)));
    }
    true
}

fn apply_page_reply(
    state: &mut AppState,
    request_id: RequestId,
    page: u32,
    result: Result<PageResponse, String>,
    effects: &mut Vec<Effect>,
) {
    if !state.is_current_page_request(request_id) {
        report_info!("Discarding stale page reply for request {}", request_id);
        return;
    }
    state.finish_page_request();
    match result {
        Ok(response) => {
            let page_state = PageState::from_response(page, &response);
            state.render_page(page_state, response.rows, effects);
            on_rendered(state);
        }
        Err(body) => {
            report_warn!("Page {} request failed: {}", page, body);
            if !state.is_pending() {
                state.set_spinner(false);
            }
            state.set_message(Some(StatusMessage::error(notify::page_failed(&body))));
        }
    }
}

/// Reaction to `ResultsEvent::Rendered`: drop progress notices once rows are visible.
fn on_rendered(state: &mut AppState) {
    if state.is_pending() {
        return;
    }
    state.set_spinner(false);
    if state
        .message()
        .is_some_and(|message| message.kind == MessageKind::Progress)
    {
        state.set_message(None);
    }
}
