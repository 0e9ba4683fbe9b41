//! Terminal rendering of the display state

use stepsense_core::{DetectedLabel, DisplayState};

pub const NOTHING_DETECTED: &str = "No obstacles detected";
pub const NO_LABELS: &str = "No labels yet";

/// Render the summary, optional label chips and confidence
pub fn render(state: &DisplayState, show_labels: bool) -> String {
    let mut lines = Vec::with_capacity(3);

    if state.summary.is_empty() {
        lines.push(NOTHING_DETECTED.to_string());
    } else {
        lines.push(state.summary.clone());
    }

    if show_labels {
        lines.push(label_panel(&state.labels));
    }

    if state.confidence > 0 {
        lines.push(format!("Confidence: {}%", state.confidence));
    }

    lines.join("\n")
}

fn label_panel(labels: &[DetectedLabel]) -> String {
    if labels.is_empty() {
        return NO_LABELS.to_string();
    }
    labels.iter().map(chip).collect::<Vec<_>>().join(" | ")
}

fn chip(label: &DetectedLabel) -> String {
    format!("{} {:.1}%", label.description, label.score * 100.0)
}
