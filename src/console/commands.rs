//! Line command parsing

use std::str::FromStr;

use crate::{config::Preset, error::PomodoroError};

pub const HELP: &str = "\
Commands:
  work              start a work session (alias: start)
  pause             pause or resume the countdown (aliases: resume, toggle)
  stop              stop the timer, keeping completed sessions
  reset             stop the timer and clear completed sessions
  status            show the current state
  config            show the configuration
  set <field> <n>   change work | short-break | long-break (seconds) or sessions
  preset <name>     load classic | focus | sprint
  dev on|off        toggle developer mode (custom durations)
  help              show this help
  quit              exit";

/// A command typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Work,
    PauseResume,
    Stop,
    Reset,
    Status,
    ShowConfig,
    Set { field: String, value: String },
    Preset(Preset),
    DeveloperMode(bool),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = PomodoroError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = words.split_first() else {
            return Err(PomodoroError::UnknownCommand(String::new()));
        };

        let command = match (name.to_lowercase().as_str(), args) {
            ("work" | "start", []) => Command::Work,
            ("pause" | "resume" | "toggle" | "p", []) => Command::PauseResume,
            ("stop", []) => Command::Stop,
            ("reset", []) => Command::Reset,
            ("status" | "s", []) => Command::Status,
            ("config", []) => Command::ShowConfig,
            ("set", [field, value]) => Command::Set {
                field: field.to_lowercase(),
                value: value.to_string(),
            },
            ("preset", [name]) => Command::Preset(
                Preset::from_name(name)
                    .ok_or_else(|| PomodoroError::invalid_config("preset", format!("unknown preset '{}'", name)))?,
            ),
            ("dev", [flag]) => match flag.to_lowercase().as_str() {
                "on" | "true" | "1" => Command::DeveloperMode(true),
                "off" | "false" | "0" => Command::DeveloperMode(false),
                _ => return Err(PomodoroError::UnknownCommand(line.trim().to_string())),
            },
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit" | "q", []) => Command::Quit,
            _ => return Err(PomodoroError::UnknownCommand(line.trim().to_string())),
        };
        Ok(command)
    }
}
