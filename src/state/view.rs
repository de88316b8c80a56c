//! Rendered popup surface and its labels

use serde::{Deserialize, Serialize};

/// Where the toggle state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Blocking is active, button offers a pause
    Blocking,
    /// Challenge panel is up, toggle not yet committed
    ChallengePending,
    /// Blocking is paused, button shows the countdown
    Cooldown,
    /// Countdown elapsed, waiting on the persisted state
    Resuming,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Blocking
    }
}

/// Everything a rendering surface needs to draw the popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub phase: Phase,
    pub button_label: String,
    pub button_visible: bool,
    pub challenge_visible: bool,
    /// Code the user must retype, empty while the challenge is hidden
    pub challenge_code: String,
    pub challenge_input: String,
    pub input_focused: bool,
    pub error_visible: bool,
}

impl View {
    /// View shown before the persisted state has been read
    pub fn initial(disable_minutes: u64) -> Self {
        Self {
            phase: Phase::Blocking,
            button_label: disable_label(disable_minutes),
            button_visible: true,
            challenge_visible: false,
            challenge_code: String::new(),
            challenge_input: String::new(),
            input_focused: false,
            error_visible: false,
        }
    }
}

/// Format a remaining duration as `M:SS`, truncating partial seconds
pub fn format_remaining(remaining_ms: i64) -> String {
    let remaining_ms = remaining_ms.max(0);
    let minutes = remaining_ms / 60_000;
    let seconds = (remaining_ms % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

pub fn countdown_label(remaining_ms: i64) -> String {
    format!("Re-enabling in {}...", format_remaining(remaining_ms))
}

pub fn disable_label(disable_minutes: u64) -> String {
    format!("Disable for {} min", disable_minutes)
}

/// Label for a pause whose resume time is unknown or already past
pub fn pending_resume_label(disable_minutes: u64) -> String {
    format!("Re-enabling in {} min...", disable_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_remaining(65_000), "1:05");
        assert_eq!(format_remaining(300_000), "5:00");
        assert_eq!(format_remaining(59_999), "0:59");
        assert_eq!(format_remaining(999), "0:00");
        assert_eq!(format_remaining(-5_000), "0:00");
        assert_eq!(format_remaining(61 * 60_000 + 9_000), "61:09");
    }

    #[test]
    fn labels() {
        assert_eq!(countdown_label(65_000), "Re-enabling in 1:05...");
        assert_eq!(disable_label(5), "Disable for 5 min");
        assert_eq!(pending_resume_label(5), "Re-enabling in 5 min...");
    }

    #[test]
    fn phase_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&Phase::ChallengePending).unwrap();
        assert_eq!(json, "\"CHALLENGE_PENDING\"");
    }
}
