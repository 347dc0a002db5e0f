use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use report_core::{
    update, Action, AppState, ControlsView, Effect, ExportFilters, ExportResult, JobStatus,
    MessageKind, Msg, PollPhase, RequestId, ResultsEvent, POLL_INTERVAL,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(report_logging::initialize_for_tests);
}

fn status_request(effects: &[Effect]) -> RequestId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchStatus { request_id }
            | Effect::StartExport { request_id, .. }
            | Effect::CancelExport { request_id }
            | Effect::DeleteExport { request_id } => Some(*request_id),
            _ => None,
        })
        .expect("status-producing effect")
}

/// Boots the controller and answers the initial status fetch with `status`.
fn boot_with(status: JobStatus) -> (AppState, Vec<Effect>) {
    let (state, effects) = update(AppState::new(), Msg::Initialized);
    let request_id = status_request(&effects);
    reply(state, request_id, Ok(status))
}

fn reply(
    state: AppState,
    request_id: RequestId,
    result: Result<JobStatus, String>,
) -> (AppState, Vec<Effect>) {
    update(state, Msg::StatusReceived { request_id, result })
}

fn pending() -> JobStatus {
    JobStatus {
        export_pending: true,
        ..JobStatus::default()
    }
}

fn succeeded(generation_time_s: f64) -> JobStatus {
    JobStatus {
        export_pending: false,
        download_url: Some("/download/report.csv".to_string()),
        last_export_result: Some(ExportResult {
            error: None,
            start_timestamp: 1_700_000_000.0,
            generation_time_s,
        }),
    }
}

#[test]
fn idle_status_shows_only_start() {
    init_logging();
    let (state, effects) = boot_with(JobStatus::default());
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(view.message, None);
    assert!(!view.spinner);
    assert_eq!(view.phase, PollPhase::Idle);
    assert_eq!(
        view.controls,
        ControlsView {
            start: true,
            cancel: false,
            download: false,
            delete: false,
        }
    );
}

#[test]
fn pending_status_shows_spinner_and_schedules_poll() {
    init_logging();
    let (state, effects) = boot_with(pending());
    let view = state.view();

    assert_eq!(effects, vec![Effect::SchedulePoll { delay: POLL_INTERVAL }]);
    assert_eq!(POLL_INTERVAL, Duration::from_millis(1000));
    assert!(view.spinner);
    assert!(!view.controls.start);
    assert!(view.controls.cancel);
    let message = view.message.expect("generating message");
    assert_eq!(message.kind, MessageKind::Progress);
    assert!(message.text.starts_with("The report is currently being generated"));
    assert_eq!(
        view.phase,
        PollPhase::Polling {
            interval: POLL_INTERVAL
        }
    );
}

#[test]
fn reported_error_hides_results_and_enables_delete() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus {
        export_pending: false,
        download_url: None,
        last_export_result: Some(ExportResult {
            error: Some("boom".to_string()),
            ..ExportResult::default()
        }),
    });
    let view = state.view();

    assert!(!view.results.visible);
    assert!(!view.spinner);
    let message = view.message.expect("failure message");
    assert_eq!(message.kind, MessageKind::Error);
    assert_eq!(message.text, "Data export failed. Reason: boom");
    assert!(view.controls.delete);
    assert!(view.controls.start);
}

#[test]
fn successful_export_requests_first_page_with_singular_message() {
    init_logging();
    let (state, effects) = boot_with(succeeded(1.0));
    let view = state.view();

    let message = view.message.expect("retrieved message");
    assert_eq!(message.kind, MessageKind::Info);
    assert!(message.text.ends_with("(1.0 second)."), "{}", message.text);
    assert!(matches!(
        effects.as_slice(),
        [Effect::FetchPage { page: 1, .. }]
    ));
    assert!(view.controls.download);
    assert!(view.controls.delete);
}

#[test]
fn plural_message_for_other_durations() {
    init_logging();
    let (state, _effects) = boot_with(succeeded(2.25));
    let text = state.view().message.unwrap().text;
    assert!(text.ends_with("(2.2 seconds).") || text.ends_with("(2.3 seconds)."));
}

#[test]
fn identical_status_is_a_noop() {
    init_logging();
    let (mut state, effects) = boot_with(succeeded(3.0));
    assert_eq!(effects.len(), 1);
    assert!(state.consume_dirty());
    let before = state.view();

    let (state, effects) = update(state, Msg::RefreshClicked);
    let request_id = status_request(&effects);
    let (mut state, effects) = reply(state, request_id, Ok(succeeded(3.0)));

    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.view(), before);
}

#[test]
fn pending_repolls_exactly_once_per_tick() {
    init_logging();
    let (state, effects) = boot_with(pending());
    assert_eq!(effects, vec![Effect::SchedulePoll { delay: POLL_INTERVAL }]);
    let message_before = state.view().message;

    let mut state = state;
    for _ in 0..3 {
        let (next, effects) = update(state, Msg::PollTimerFired);
        assert_eq!(next.view().phase, PollPhase::Idle);
        let request_id = status_request(&effects);
        assert_eq!(effects.len(), 1);

        let (next, effects) = reply(next, request_id, Ok(pending()));
        assert_eq!(effects, vec![Effect::SchedulePoll { delay: POLL_INTERVAL }]);
        assert_eq!(next.view().message, message_before);
        state = next;
    }

    let (state, effects) = update(state, Msg::PollTimerFired);
    let request_id = status_request(&effects);
    let (state, effects) = reply(state, request_id, Ok(succeeded(4.0)));
    assert!(matches!(effects.as_slice(), [Effect::FetchPage { .. }]));
    assert_eq!(state.view().phase, PollPhase::Idle);
}

#[test]
fn second_pending_reply_does_not_double_schedule() {
    init_logging();
    let (state, _effects) = boot_with(pending());
    let (state, effects) = update(state, Msg::RefreshClicked);
    let request_id = status_request(&effects);

    let (_state, effects) = reply(state, request_id, Ok(pending()));
    assert!(effects.is_empty());
}

#[test]
fn actions_disable_controls_until_reply() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus::default());
    let (state, effects) = update(state, Msg::StartClicked);
    let request_id = status_request(&effects);
    let view = state.view();

    assert_eq!(view.controls, ControlsView::default());
    assert!(view.spinner);
    assert_eq!(
        view.phase,
        PollPhase::ActionInFlight {
            action: Action::Start
        }
    );

    let (state, effects) = update(state, Msg::StartClicked);
    assert!(effects.is_empty());

    let (state, _effects) = reply(state, request_id, Ok(pending()));
    let view = state.view();
    assert!(view.controls.cancel);
    assert!(!view.controls.start);
}

#[test]
fn start_sends_current_filters() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus::default());
    let (state, _) = update(
        state,
        Msg::BlockTypesSelected(vec!["mcq".to_string(), "freeform".to_string()]),
    );
    let (state, _) = update(state, Msg::RootBlockChanged("block-v1:course+type@chapter".into()));
    let (state, _) = update(state, Msg::UsernamesChanged("alice, bob".into()));
    let (state, _) = update(state, Msg::MatchStringChanged("photosynthesis".into()));

    let (_state, effects) = update(state, Msg::StartClicked);
    assert_eq!(
        effects,
        vec![Effect::StartExport {
            request_id: 2,
            filters: ExportFilters {
                block_types: vec!["mcq".to_string(), "freeform".to_string()],
                root_block_id: "block-v1:course+type@chapter".to_string(),
                usernames: "alice, bob".to_string(),
                match_string: "photosynthesis".to_string(),
            },
        }]
    );
}

#[test]
fn command_failure_is_reconciled_as_job_error() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus::default());
    let (state, effects) = update(state, Msg::StartClicked);
    let request_id = status_request(&effects);

    let (state, effects) = reply(state, request_id, Err("Internal Server Error".to_string()));
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(
        view.message.unwrap().text,
        "Data export failed. Reason: Internal Server Error"
    );
    assert!(!view.spinner);
    assert!(view.controls.start);
    assert!(view.controls.delete);
    assert!(!state.status().unwrap().export_pending);
}

#[test]
fn unchanged_reply_to_action_clears_spinner() {
    init_logging();
    let (state, _effects) = boot_with(succeeded(2.0));
    let (state, effects) = update(state, Msg::DeleteClicked);
    let request_id = status_request(&effects);
    assert!(state.view().spinner);

    let (state, effects) = reply(state, request_id, Ok(succeeded(2.0)));
    assert!(effects.is_empty());
    assert!(!state.view().spinner);
    assert!(state.view().controls.delete);
}

#[test]
fn delete_returns_to_idle() {
    init_logging();
    let (state, _effects) = boot_with(succeeded(2.0));
    let (state, effects) = update(state, Msg::DeleteClicked);
    let request_id = status_request(&effects);

    let (state, _effects) = reply(state, request_id, Ok(JobStatus::default()));
    let view = state.view();
    assert_eq!(view.message, None);
    assert!(!view.spinner);
    assert!(view.controls.start);
    assert!(!view.controls.delete);
    assert!(!view.controls.download);
}

#[test]
fn stale_poll_after_cancel_is_discarded() {
    init_logging();
    let (state, _effects) = boot_with(pending());
    let (state, effects) = update(state, Msg::PollTimerFired);
    let poll_id = status_request(&effects);

    let (state, effects) = update(state, Msg::CancelClicked);
    let cancel_id = status_request(&effects);
    assert!(cancel_id > poll_id);

    let (state, _effects) = reply(state, cancel_id, Ok(JobStatus::default()));
    let settled = state.view();

    let (state, effects) = reply(state, poll_id, Ok(pending()));
    assert!(effects.is_empty());
    assert_eq!(state.view(), settled);
    assert!(!state.status().unwrap().export_pending);
}

#[test]
fn download_only_with_download_url() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus::default());
    let (state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::RefreshClicked);
    let request_id = status_request(&effects);
    let (state, _effects) = reply(state, request_id, Ok(succeeded(1.5)));

    let (state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(effects, vec![Effect::DownloadReport]);

    let (state, _) = update(
        state,
        Msg::DownloadFinished(Ok("out/report.csv".to_string())),
    );
    assert_eq!(state.view().message.unwrap().text, "Report saved to out/report.csv");

    let (state, _) = update(state, Msg::DownloadFinished(Err("404 Not Found".to_string())));
    let message = state.view().message.unwrap();
    assert_eq!(message.kind, MessageKind::Error);
    assert_eq!(message.text, "Report download failed. Reason: 404 Not Found");
}

#[test]
fn results_hidden_event_only_when_visible() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus::default());
    let (_state, effects) = update(state, Msg::StartClicked);
    assert!(!effects.contains(&Effect::Results(ResultsEvent::Hidden)));
}

#[test]
fn refresh_during_action_does_not_lock_controls() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus::default());
    let (state, effects) = update(state, Msg::StartClicked);
    let start_id = status_request(&effects);
    let (state, effects) = update(state, Msg::RefreshClicked);
    let refresh_id = status_request(&effects);
    assert!(refresh_id > start_id);

    let (state, _effects) = reply(state, start_id, Ok(pending()));
    assert_eq!(state.poll_phase(), PollPhase::Idle);
    let (state, effects) = reply(state, refresh_id, Ok(pending()));
    assert_eq!(effects, vec![Effect::SchedulePoll { delay: POLL_INTERVAL }]);

    let (state, effects) = update(state, Msg::PollTimerFired);
    let poll_id = status_request(&effects);
    let (state, _effects) = reply(state, poll_id, Err("boom".to_string()));

    let view = state.view();
    assert_ne!(view.controls, ControlsView::default());
    assert!(view.controls.cancel);
    assert_eq!(view.phase, PollPhase::Idle);
}

#[test]
fn refresh_reply_first_then_action_reply_restores_controls() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus::default());
    let (state, effects) = update(state, Msg::DeleteClicked);
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::StartClicked);
    let start_id = status_request(&effects);
    let (state, effects) = update(state, Msg::RefreshClicked);
    let refresh_id = status_request(&effects);

    let (state, _effects) = reply(state, refresh_id, Ok(JobStatus::default()));
    assert_eq!(state.view().controls, ControlsView::default());

    let (state, effects) = reply(state, start_id, Ok(pending()));
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.controls.start);
    assert!(!view.spinner);
}

#[test]
fn failed_poll_keeps_status_and_stops_polling() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus {
        export_pending: true,
        ..succeeded(2.0)
    });
    let status_before = state.status().cloned();
    let view_before = state.view();

    let (state, effects) = update(state, Msg::PollTimerFired);
    let poll_id = status_request(&effects);
    let (state, effects) = reply(state, poll_id, Err("Bad Gateway".to_string()));

    assert!(effects.is_empty());
    assert_eq!(state.status().cloned(), status_before);
    let view = state.view();
    assert_eq!(view.controls, view_before.controls);
    assert_eq!(view.message, view_before.message);
    assert_eq!(view.results.visible, view_before.results.visible);
    assert_eq!(view.phase, PollPhase::Idle);

    let (state, effects) = update(state, Msg::RefreshClicked);
    let request_id = status_request(&effects);
    let (_state, effects) = reply(state, request_id, Ok(pending()));
    assert_eq!(effects, vec![Effect::SchedulePoll { delay: POLL_INTERVAL }]);
}

#[test]
fn finished_report_can_be_deleted_while_new_export_runs() {
    init_logging();
    let (state, _effects) = boot_with(JobStatus {
        export_pending: true,
        ..succeeded(2.0)
    });
    let controls = state.view().controls;
    assert!(controls.delete);
    assert!(controls.cancel);
    assert!(!controls.start);
}
