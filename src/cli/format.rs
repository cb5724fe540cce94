//! Output formatting for CLI display.

use sprinkler::{history::History, model::ActualState};

/// Shown when no command has ever been recorded.
pub(super) const NO_STATE_SET: &str = "No state set";

/// Current command followed by past commands, most recent first.
pub(super) fn format_history(history: &History) -> Vec<String> {
    if history.current().is_none() && history.past().is_empty() {
        return vec![NO_STATE_SET.to_string()];
    }

    let mut lines = vec![match history.current() {
        Some(record) => format!("Current command: {record}"),
        None => "Current command: (unreadable)".to_string(),
    }];
    if !history.past().is_empty() {
        lines.push("History:".to_string());
        lines.extend(history.lines().into_iter().map(|l| format!("  {l}")));
    }
    lines
}

/// Per-mode counts, "Totals to date".
pub(super) fn format_totals(history: &History) -> Vec<String> {
    let totals = history.totals();
    if totals.is_empty() {
        return Vec::new();
    }
    let counts = totals
        .iter()
        .map(|(command, count)| format!("{command}:{count}"))
        .collect::<Vec<_>>()
        .join("  ");
    vec![format!("Totals to date: {counts}")]
}

pub(super) fn format_actual(actual: &ActualState) -> Vec<String> {
    vec![
        format!(
            "Current actual state: {} {} {}",
            actual.date, actual.state, actual.time
        ),
        format!("Current temperature: {}", actual.temperature),
    ]
}
