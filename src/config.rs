//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PomodoroError;

/// Directory name used under the platform data dir
pub const APP_DIR_NAME: &str = "pomodoro-keeper";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-keeper")]
#[command(about = "A Pomodoro timer that survives restarts and suspension")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Directory holding the persisted timer state
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Extra file mirroring the timer state for companion widgets
    #[arg(long)]
    pub shared_state: Option<PathBuf>,

    /// Allow custom durations (otherwise the classic preset is always used)
    #[arg(short, long)]
    pub developer_mode: bool,

    /// Start from a named preset
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Work duration in seconds
    #[arg(long)]
    pub work: Option<u64>,

    /// Short break duration in seconds
    #[arg(long)]
    pub short_break: Option<u64>,

    /// Long break duration in seconds
    #[arg(long)]
    pub long_break: Option<u64>,

    /// Completed work sessions before a long break
    #[arg(long)]
    pub sessions_until_long_break: Option<u32>,

    /// Pause in seconds between the end of a work session and the break (0 disables it)
    #[arg(long, default_value = "1")]
    pub transition_delay: u64,

    /// Tick cadence in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_interval_ms: u64,

    /// Shell command run on every phase transition
    #[arg(long)]
    pub notify_command: Option<String>,

    /// Print responses as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Directory for persisted state, falling back to the platform data dir
    pub fn state_dir(&self) -> Option<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME)))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn transition_delay(&self) -> Option<Duration> {
        (self.transition_delay > 0).then(|| Duration::from_secs(self.transition_delay))
    }

    /// Build the timer configuration. A preset replaces the stored
    /// configuration; explicit duration flags override either.
    pub fn timer_config(&self, stored: Option<TimerConfig>) -> Result<TimerConfig, PomodoroError> {
        let mut config = match (self.preset, stored) {
            (Some(preset), stored) => TimerConfig {
                developer_mode: stored.is_some_and(|c| c.developer_mode),
                ..preset.config()
            },
            (None, Some(stored)) => stored,
            (None, None) => TimerConfig::default(),
        };
        config.developer_mode |= self.developer_mode;

        if let Some(work) = self.work {
            config.work_duration = work;
        }
        if let Some(short_break) = self.short_break {
            config.short_break_duration = short_break;
        }
        if let Some(long_break) = self.long_break {
            config.long_break_duration = long_break;
        }
        if let Some(sessions) = self.sessions_until_long_break {
            config.sessions_until_long_break = sessions;
        }

        let customised = self.preset.is_some()
            || self.work.is_some()
            || self.short_break.is_some()
            || self.long_break.is_some()
            || self.sessions_until_long_break.is_some();
        if customised && !config.developer_mode {
            warn!("Custom durations are ignored unless --developer-mode is set");
        }

        config.validate()?;
        Ok(config)
    }
}

/// Named duration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// 25/5/15, long break every 4 sessions
    Classic,
    /// 50/10/20, long break every 3 sessions
    Focus,
    /// 15/3/10, long break every 6 sessions
    Sprint,
}

impl Preset {
    pub fn config(self) -> TimerConfig {
        let (work, short_break, long_break, sessions) = match self {
            Preset::Classic => (25, 5, 15, 4),
            Preset::Focus => (50, 10, 20, 3),
            Preset::Sprint => (15, 3, 10, 6),
        };
        TimerConfig {
            work_duration: work * 60,
            short_break_duration: short_break * 60,
            long_break_duration: long_break * 60,
            sessions_until_long_break: sessions,
            developer_mode: false,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" => Some(Preset::Classic),
            "focus" => Some(Preset::Focus),
            "sprint" => Some(Preset::Sprint),
            _ => None,
        }
    }
}

/// Durations and cadence for the phase cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    /// Work phase length in seconds
    pub work_duration: u64,
    /// Short break length in seconds
    pub short_break_duration: u64,
    /// Long break length in seconds
    pub long_break_duration: u64,
    /// Every Nth completed session is followed by a long break
    pub sessions_until_long_break: u32,
    /// Gates whether the values above are honoured
    pub developer_mode: bool,
}

impl TimerConfig {
    /// Reject zero durations and a zero long-break cadence
    pub fn validate(&self) -> Result<(), PomodoroError> {
        let durations = [
            ("work", self.work_duration),
            ("short-break", self.short_break_duration),
            ("long-break", self.long_break_duration),
        ];
        for (field, value) in durations {
            if value == 0 {
                return Err(PomodoroError::invalid_config(field, "duration must be positive"));
            }
        }
        if self.sessions_until_long_break < 1 {
            return Err(PomodoroError::invalid_config(
                "sessions",
                "sessions until long break must be at least 1",
            ));
        }
        Ok(())
    }

    /// The configuration actually in force
    pub fn effective(&self) -> TimerConfig {
        if self.developer_mode {
            *self
        } else {
            TimerConfig::default()
        }
    }

    /// Copy of this configuration with one field replaced from user input
    pub fn with_field(&self, field: &str, value: &str) -> Result<TimerConfig, PomodoroError> {
        let mut updated = *self;
        match field {
            "work" => updated.work_duration = parse_number(field, value)?,
            "short-break" | "short" => updated.short_break_duration = parse_number(field, value)?,
            "long-break" | "long" => updated.long_break_duration = parse_number(field, value)?,
            "sessions" => updated.sessions_until_long_break = parse_number(field, value)?,
            _ => return Err(PomodoroError::invalid_config(field, "unknown setting")),
        }
        updated.validate()?;
        Ok(updated)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Preset::Classic.config()
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, PomodoroError> {
    value
        .trim()
        .parse()
        .map_err(|_| PomodoroError::invalid_config(field, format!("'{}' is not a valid number", value)))
}
