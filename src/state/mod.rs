//! State management module
//!
//! The pure timer model lives in [`timer_state`]; [`controller`] is the only
//! thing allowed to mutate it.

pub mod controller;
pub mod event;
pub mod phase;
pub mod timer_state;

// Re-export main types
pub use controller::{ControllerSettings, TimerController};
pub use event::TimerEvent;
pub use phase::Phase;
pub use timer_state::TimerState;
