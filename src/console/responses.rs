//! Console response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::TimerConfig,
    state::{Phase, TimerState},
};

/// Read-only view of the timer handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub phase: Phase,
    pub label: String,
    pub remaining: String,
    pub remaining_seconds: u64,
    pub progress: f64,
    pub completed_sessions: u32,
    pub is_running: bool,
}

impl From<&TimerState> for StatusView {
    fn from(state: &TimerState) -> Self {
        Self {
            phase: state.current_phase,
            label: state.current_phase.label().to_string(),
            remaining: state.formatted_remaining(),
            remaining_seconds: state.remaining_whole_seconds(),
            progress: state.progress(),
            completed_sessions: state.completed_sessions,
            is_running: state.is_running,
        }
    }
}

/// Response printed after every command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub snapshot: StatusView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<TimerConfig>,
}

impl CommandResponse {
    /// Create a response whose status reflects the timer state
    pub fn new(message: impl Into<String>, state: &TimerState) -> Self {
        let status = if state.is_running {
            "running"
        } else if state.current_phase == Phase::Stopped {
            "stopped"
        } else {
            "paused"
        };
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            snapshot: StatusView::from(state),
            config: None,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, state: &TimerState) -> Self {
        Self {
            status: "error".to_string(),
            ..Self::new(message, state)
        }
    }

    pub fn with_config(mut self, config: TimerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// One-line human readable form
    pub fn render_text(&self) -> String {
        let view = &self.snapshot;
        let mut text = format!(
            "[{}] {} {} ({:.0}%) sessions: {}",
            self.status,
            view.label,
            view.remaining,
            view.progress * 100.0,
            view.completed_sessions
        );
        if !self.message.is_empty() {
            text.push_str(" - ");
            text.push_str(&self.message);
        }
        if let Some(config) = &self.config {
            let effective = config.effective();
            text.push_str(&format!(
                "\n  developer mode: {}\n  work: {}s, short break: {}s, long break: {}s, long break every {} sessions",
                if config.developer_mode { "on" } else { "off" },
                effective.work_duration,
                effective.short_break_duration,
                effective.long_break_duration,
                effective.sessions_until_long_break
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn paused_work() -> TimerState {
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        let mut state = TimerState::new(now);
        state.start_work_session(&TimerConfig::default(), now);
        state.tick_by(1375.0, now);
        state.pause(now);
        state
    }

    #[test]
    fn test_status_view_from_state() {
        let view = StatusView::from(&paused_work());
        assert_eq!(view.phase, Phase::Work);
        assert_eq!(view.remaining, "02:05");
        assert_eq!(view.remaining_seconds, 125);
        assert!(!view.is_running);
    }

    #[test]
    fn test_response_status_and_text() {
        let response = CommandResponse::new("Timer paused", &paused_work());
        assert_eq!(response.status, "paused");
        assert_eq!(
            response.render_text(),
            "[paused] Work 02:05 (92%) sessions: 0 - Timer paused"
        );

        let error = CommandResponse::error("nope", &paused_work());
        assert_eq!(error.status, "error");
    }

    #[test]
    fn test_response_json_shape() {
        let response = CommandResponse::new("", &TimerState::new(Utc::now()));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "stopped");
        assert_eq!(value["snapshot"]["phase"], "Stopped");
        assert_eq!(value["snapshot"]["completedSessions"], 0);
        assert!(value.get("config").is_none());
    }
}
