//! Background tasks reacting to timer changes

use tokio::sync::{
    broadcast::{self, error::RecvError},
    watch,
};
use tracing::{debug, info, warn};

use crate::{
    services::run_notify_command,
    state::{TimerEvent, TimerState},
};

/// Log every transition event and run the notify hook, if configured
pub async fn notifier_task(mut events: broadcast::Receiver<TimerEvent>, notify_command: Option<String>) {
    info!("Starting notifier task");

    loop {
        match events.recv().await {
            Ok(event) => {
                match &event {
                    TimerEvent::PhaseCompleted { phase, completed_sessions } => {
                        info!("{} finished ({} sessions completed)", phase, completed_sessions);
                    }
                    TimerEvent::PhaseStarted { phase, duration } => {
                        info!("{} running for {}s", phase, duration);
                    }
                    other => debug!("Timer event: {}", other.name()),
                }

                if let Some(command) = &notify_command {
                    if let Err(e) = run_notify_command(command, &event).await {
                        warn!("{}", e);
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Notifier fell behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Event channel closed, notifier exiting");
                break;
            }
        }
    }
}

/// Trace every published snapshot
pub async fn snapshot_log_task(mut snapshots: watch::Receiver<TimerState>) {
    while snapshots.changed().await.is_ok() {
        let state = snapshots.borrow_and_update().clone();
        debug!(
            "Snapshot: phase={:?} remaining={} running={} sessions={}",
            state.current_phase,
            state.formatted_remaining(),
            state.is_running,
            state.completed_sessions
        );
    }
    debug!("Snapshot channel closed");
}
