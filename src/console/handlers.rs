//! Console command handlers

use tracing::info;

use super::{
    commands::{Command, HELP},
    responses::CommandResponse,
};
use crate::{error::PomodoroError, state::TimerController};

/// Apply one command to the controller
pub fn handle_command(controller: &TimerController, command: Command) -> Result<CommandResponse, PomodoroError> {
    let response = match command {
        Command::Work => CommandResponse::new("Work session started", &controller.start_work_session()),
        Command::PauseResume => {
            let state = controller.pause_resume();
            let message = if state.is_running { "Timer running" } else { "Timer paused" };
            CommandResponse::new(message, &state)
        }
        Command::Stop => CommandResponse::new("Timer stopped", &controller.stop()),
        Command::Reset => CommandResponse::new("Timer reset", &controller.reset()),
        Command::Status => CommandResponse::new("", &controller.snapshot()),
        Command::ShowConfig => {
            CommandResponse::new("", &controller.snapshot()).with_config(controller.config())
        }
        Command::Set { field, value } => {
            let updated = controller.config().with_field(&field, &value)?;
            let config = controller.update_config(updated)?;
            let message = if config.developer_mode {
                format!("{} updated, applies from the next phase", field)
            } else {
                format!("{} stored; enable developer mode to use it", field)
            };
            CommandResponse::new(message, &controller.snapshot()).with_config(config)
        }
        Command::Preset(preset) => {
            let mut updated = preset.config();
            updated.developer_mode = controller.config().developer_mode;
            let config = controller.update_config(updated)?;
            info!("Loaded {:?} preset", preset);
            CommandResponse::new(format!("{:?} preset loaded", preset), &controller.snapshot()).with_config(config)
        }
        Command::DeveloperMode(enabled) => {
            let mut updated = controller.config();
            updated.developer_mode = enabled;
            let config = controller.update_config(updated)?;
            let message = if enabled { "Developer mode on" } else { "Developer mode off" };
            CommandResponse::new(message, &controller.snapshot()).with_config(config)
        }
        Command::Help => CommandResponse::new(HELP, &controller.snapshot()),
        Command::Quit => CommandResponse::new("Bye", &controller.snapshot()),
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        config::{Preset, TimerConfig},
        state::{ControllerSettings, Phase},
        storage::MemoryStore,
        tasks::ManualScheduler,
    };
    use chrono::Utc;
    use std::sync::Arc;

    fn controller() -> Arc<TimerController> {
        TimerController::start(
            Arc::new(MemoryStore::new()),
            Arc::new(ManualScheduler::new()),
            Arc::new(ManualClock::new(Utc::now())),
            TimerConfig::default(),
            ControllerSettings::default(),
        )
    }

    #[test]
    fn test_work_then_pause() {
        let controller = controller();

        let response = handle_command(&controller, Command::Work).unwrap();
        assert_eq!(response.status, "running");
        assert_eq!(response.snapshot.phase, Phase::Work);

        let response = handle_command(&controller, Command::PauseResume).unwrap();
        assert_eq!(response.status, "paused");
        assert_eq!(response.message, "Timer paused");
    }

    #[test]
    fn test_settings_need_developer_mode() {
        let controller = controller();

        let response = handle_command(
            &controller,
            Command::Set {
                field: "work".to_string(),
                value: "600".to_string(),
            },
        )
        .unwrap();
        assert!(response.message.contains("enable developer mode"));
        assert_eq!(controller.start_work_session().total_time, 1500.0);

        handle_command(&controller, Command::DeveloperMode(true)).unwrap();
        assert_eq!(controller.start_work_session().total_time, 600.0);
    }

    #[test]
    fn test_preset_keeps_developer_mode() {
        let controller = controller();
        handle_command(&controller, Command::DeveloperMode(true)).unwrap();

        let response = handle_command(&controller, Command::Preset(Preset::Focus)).unwrap();
        let config = response.config.unwrap();
        assert!(config.developer_mode);
        assert_eq!(config.work_duration, 3000);
    }

    #[test]
    fn test_invalid_setting_is_rejected() {
        let controller = controller();
        let result = handle_command(
            &controller,
            Command::Set {
                field: "sessions".to_string(),
                value: "0".to_string(),
            },
        );
        assert!(matches!(result, Err(PomodoroError::InvalidConfiguration { .. })));
        assert_eq!(controller.config(), TimerConfig::default());
    }
}
