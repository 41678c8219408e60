//! Progress bar styles shared by the tools.
use indicatif::{ProgressBar, ProgressStyle};

const BAR_CHARS: &str = "▉▊▋▌▍▎▏ ";

/// Bar counting individual points, updated in coarse steps.
pub fn point_progress_bar(total: u64, message: &'static str) -> ProgressBar {
    styled_bar(
        total,
        "[{bar:40.cyan/blue}] {pos}/{len} points ({percent}%) {msg}",
        message,
    )
}

/// Bar counting discrete work units such as files or tiles.
pub fn unit_progress_bar(total: u64, unit: &str, message: &'static str) -> ProgressBar {
    let template = format!("[{{bar:40.green/blue}}] {{pos}}/{{len}} {unit} ({{percent}}%) {{msg}}");
    styled_bar(total, &template, message)
}

fn styled_bar(total: u64, template: &str, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    // A malformed template falls back to the default bar style.
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars(BAR_CHARS));
    }
    pb.set_message(message);
    pb
}
