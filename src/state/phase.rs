//! Timer phases

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;

/// Which interval is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    Work,
    #[serde(alias = "Short Break")]
    ShortBreak,
    #[serde(alias = "Long Break")]
    LongBreak,
    #[default]
    Stopped,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Work, Phase::ShortBreak, Phase::LongBreak, Phase::Stopped];

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
            Phase::Stopped => "Stopped",
        }
    }

    /// Duration under the classic preset, in seconds
    pub fn nominal_duration(&self) -> f64 {
        self.duration(&TimerConfig::default())
    }

    /// Duration under the given configuration, in seconds
    pub fn duration(&self, config: &TimerConfig) -> f64 {
        match self {
            Phase::Work => config.work_duration as f64,
            Phase::ShortBreak => config.short_break_duration as f64,
            Phase::LongBreak => config.long_break_duration as f64,
            Phase::Stopped => 0.0,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
