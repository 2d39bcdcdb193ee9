//! Persistence port for the timer state and its configuration
//!
//! The controller only talks to a [`StateStore`]; backends decide where the
//! records actually live.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::{config::TimerConfig, error::PomodoroError, state::TimerState};

/// Fixed key of the persisted record
pub const STATE_KEY: &str = "TimerState";

/// Key of the persisted phase configuration
pub const CONFIG_KEY: &str = "TimerConfig";

/// Storage for the single persisted [`TimerState`] record
pub trait StateStore: Send + Sync {
    /// Load the stored state. `Ok(None)` means nothing was stored yet.
    fn load(&self) -> Result<Option<TimerState>, PomodoroError>;

    /// Replace the stored state as a whole
    fn save(&self, state: &TimerState) -> Result<(), PomodoroError>;

    /// Remove the stored state
    fn clear(&self) -> Result<(), PomodoroError>;

    /// Load the stored configuration. `Ok(None)` means it was never changed.
    fn load_config(&self) -> Result<Option<TimerConfig>, PomodoroError>;

    fn save_config(&self, config: &TimerConfig) -> Result<(), PomodoroError>;
}
