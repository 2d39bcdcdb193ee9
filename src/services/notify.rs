//! Notification hook execution

use tokio::process::Command;
use tracing::{debug, info};

use crate::state::TimerEvent;

/// Environment passed to the notification hook
pub fn notify_env(event: &TimerEvent) -> Vec<(&'static str, String)> {
    let mut env = vec![("POMODORO_EVENT", event.name().to_string())];
    if let Some(phase) = event.phase() {
        env.push(("POMODORO_PHASE", format!("{:?}", phase)));
        env.push(("POMODORO_PHASE_LABEL", phase.label().to_string()));
    }
    if let TimerEvent::PhaseCompleted { completed_sessions, .. } = event {
        env.push(("POMODORO_SESSIONS", completed_sessions.to_string()));
    }
    env
}

/// Run the user's notification command through the shell
pub async fn run_notify_command(command: &str, event: &TimerEvent) -> Result<(), String> {
    debug!("Running notify command for {}", event.name());

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .envs(notify_env(event))
        .output()
        .await
        .map_err(|e| format!("Failed to execute notify command: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "Notify command exited with {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ));
    }

    info!("Notify command completed for {}", event.name());
    Ok(())
}
