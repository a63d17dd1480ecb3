//! Formatting utilities for CLI output.

use crate::services::audio::AudioStatus;

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";
    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// Formats a status for human-readable CLI output.
///
/// # Examples
///
/// ```
/// use audiod::{cli::formatting::format_status_plain, services::AudioStatus};
///
/// let status = AudioStatus { volume: 44, ..AudioStatus::default() };
/// assert!(format_status_plain(&status).starts_with("volume: 44%"));
/// ```
pub fn format_status_plain(status: &AudioStatus) -> String {
    format!(
        "volume: {}%\nmute: {}\nin call: {}\nspeaker: {}\nmic mute: {}",
        status.volume,
        on_off(status.mute),
        on_off(status.in_call),
        on_off(status.speaker_mode),
        on_off(status.mic_mute),
    )
}

/// Formats a status with a styled header
pub fn format_status(status: &AudioStatus) -> String {
    format!(
        "{}\n{}",
        format_header("Audio status"),
        format_status_plain(status)
    )
}
