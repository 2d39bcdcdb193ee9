//! Pomodoro Keeper - a Pomodoro timer that survives restarts and suspension
//!
//! This library provides the timer state model, the controller that drives it
//! against wall-clock time, and the ports it uses for storage, scheduling and
//! time.

pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, TimerConfig};
pub use error::PomodoroError;
pub use state::{ControllerSettings, Phase, TimerController, TimerEvent, TimerState};
pub use storage::StateStore;
pub use utils::signals::shutdown_signal;
