//! Transition notifications

use serde::{Deserialize, Serialize};

use super::Phase;

/// Something noteworthy the controller did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TimerEvent {
    /// A phase began counting down from `duration` seconds
    PhaseStarted { phase: Phase, duration: f64 },
    /// A countdown reached zero
    PhaseCompleted { phase: Phase, completed_sessions: u32 },
    Paused,
    Resumed,
    Stopped,
    Reset,
    ConfigChanged,
}

impl TimerEvent {
    /// Short name, also exported to notify commands
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::PhaseStarted { .. } => "phase-started",
            TimerEvent::PhaseCompleted { .. } => "phase-completed",
            TimerEvent::Paused => "paused",
            TimerEvent::Resumed => "resumed",
            TimerEvent::Stopped => "stopped",
            TimerEvent::Reset => "reset",
            TimerEvent::ConfigChanged => "config-changed",
        }
    }

    /// Phase the event refers to, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            TimerEvent::PhaseStarted { phase, .. } | TimerEvent::PhaseCompleted { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
