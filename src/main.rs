//! Pomodoro Keeper - a Pomodoro timer that survives restarts and suspension
//!
//! This is the main entry point for the pomodoro-keeper application.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{info, warn};

use pomodoro_keeper::{
    clock::SystemClock,
    config::{Config, TimerConfig},
    console::run_console,
    state::{ControllerSettings, TimerController},
    storage::{JsonFileStore, MemoryStore, StateStore},
    tasks::{notifier_task, snapshot_log_task, TokioScheduler},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so stdout only carries command responses
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!("pomodoro_keeper={}", config.log_level()))
        .init();

    info!("Starting pomodoro-keeper v1.0.0");

    let store: Arc<dyn StateStore> = match config.state_dir() {
        Some(dir) => {
            let mut store = JsonFileStore::new(dir);
            if let Some(shared) = &config.shared_state {
                store = store.with_shared(shared);
            }
            info!("Persisting timer state to {}", store.path().display());
            Arc::new(store)
        }
        None => {
            warn!("No data directory available, timer state will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    let stored_config = store.load_config().unwrap_or_else(|e| {
        warn!("{}; ignoring the stored configuration", e);
        None
    });
    let timer_config = config.timer_config(stored_config).unwrap_or_else(|e| {
        warn!("{}; using the classic preset", e);
        TimerConfig::default()
    });
    info!(
        "Configuration: developer_mode={}, tick={:?}, transition_delay={:?}",
        timer_config.developer_mode,
        config.tick_interval(),
        config.transition_delay()
    );

    let settings = ControllerSettings {
        tick_interval: config.tick_interval(),
        transition_delay: config.transition_delay(),
    };
    let controller = TimerController::new(
        store,
        Arc::new(TokioScheduler::new(Handle::current())),
        Arc::new(SystemClock),
        timer_config,
        settings,
    );

    // Subscribe before reconciling so a phase that finished while we were
    // down still reaches the notifier
    tokio::spawn(notifier_task(controller.events(), config.notify_command.clone()));
    tokio::spawn(snapshot_log_task(controller.subscribe()));
    controller.recover();

    run_console(Arc::clone(&controller), config.json).await?;

    controller.shutdown();
    info!("Shutdown complete");
    Ok(())
}
