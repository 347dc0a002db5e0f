//! User-facing status texts.

use chrono::DateTime;

use crate::ExportResult;

pub const GENERATING_MESSAGE: &str = "The report is currently being generated\u{2026}";

pub fn export_failed(reason: &str) -> String {
    format!("Data export failed. Reason: {reason}")
}

pub fn page_failed(reason: &str) -> String {
    format!("Failed to load results. Reason: {reason}")
}

pub fn download_failed(reason: &str) -> String {
    format!("Report download failed. Reason: {reason}")
}

pub fn download_saved(path: &str) -> String {
    format!("Report saved to {path}")
}

/// "Results retrieved at <time> (<n> second[s])."
pub fn results_retrieved(result: &ExportResult) -> String {
    let seconds = seconds_label(result.generation_time_s);
    let unit = if is_singular(&seconds) {
        "second"
    } else {
        "seconds"
    };
    format!(
        "Results retrieved at {} ({seconds} {unit}).",
        format_timestamp(result.start_timestamp)
    )
}

/// Generation time rounded to one decimal place.
pub fn seconds_label(generation_time_s: f64) -> String {
    format!("{generation_time_s:.1}")
}

/// Singular only when the rounded value is exactly one.
fn is_singular(label: &str) -> bool {
    matches!(label.parse::<f64>(), Ok(value) if value == 1.0)
}

fn format_timestamp(epoch_seconds: f64) -> String {
    let secs = epoch_seconds.floor();
    let nanos = ((epoch_seconds - secs) * 1e9) as u32;
    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => epoch_seconds.to_string(),
    }
}
