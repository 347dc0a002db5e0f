use report_core::{
    Action, AppViewModel, ControlsView, MessageKind, PollPhase, RecordRow, ResultsView,
};

/// Widest a table cell gets before it is cut.
const MAX_CELL_WIDTH: usize = 32;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let spinner = if view.spinner { " [working]" } else { "" };
    out.push_str(&format!("Status: {}{}\n", phase_label(view.phase), spinner));

    if let Some(message) = &view.message {
        let prefix = match message.kind {
            MessageKind::Info | MessageKind::Progress => "",
            MessageKind::Error => "error: ",
        };
        out.push_str(&format!("{prefix}{}\n", message.text));
    }

    out.push_str(&format!("Actions: {}\n", format_controls(&view.controls)));

    if view.results.visible {
        out.push_str(&format_results(&view.results));
    }
    out
}

fn phase_label(phase: PollPhase) -> String {
    match phase {
        PollPhase::Idle => "Idle".to_string(),
        PollPhase::Polling { interval } => format!("Polling every {} ms", interval.as_millis()),
        PollPhase::ActionInFlight { action } => {
            let name = match action {
                Action::Start => "start",
                Action::Cancel => "cancel",
                Action::Delete => "delete",
            };
            format!("Waiting for {name}")
        }
    }
}

fn format_controls(controls: &ControlsView) -> String {
    [
        ("start", controls.start),
        ("cancel", controls.cancel),
        ("download", controls.download),
        ("delete", controls.delete),
    ]
    .iter()
    .map(|(name, enabled)| toggle(name, *enabled))
    .collect::<Vec<_>>()
    .join(" ")
}

fn toggle(name: &str, enabled: bool) -> String {
    if enabled {
        format!("[{name}]")
    } else {
        format!(" {name} ")
    }
}

fn format_results(results: &ResultsView) -> String {
    let mut out = String::new();
    let widths = column_widths(&results.rows);

    out.push_str(&format_row(&RecordRow::COLUMNS, &widths));
    out.push_str(&format_separator(&widths));
    for row in &results.rows {
        out.push_str(&format_row(&row.cells(), &widths));
    }

    out.push_str(&format!(
        "{} {} Page {} of {} ({} results) {} {}\n",
        toggle("first", results.back_enabled),
        toggle("prev", results.back_enabled),
        results.page_label,
        results.total_pages_label,
        results.num_results,
        toggle("next", results.forward_enabled),
        toggle("last", results.forward_enabled),
    ));
    out
}

fn column_widths(rows: &[RecordRow]) -> [usize; 7] {
    let mut widths = RecordRow::COLUMNS.map(|title| title.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count()).min(MAX_CELL_WIDTH);
        }
    }
    widths
}

fn format_row(cells: &[&str; 7], widths: &[usize; 7]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = *width))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{}\n", line.trim_end())
}

fn format_separator(widths: &[usize; 7]) -> String {
    let line = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("-+-");
    format!("{line}\n")
}

fn truncate(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let mut cut: String = cell.chars().take(width.saturating_sub(1)).collect();
    cut.push('\u{2026}');
    cut
}
