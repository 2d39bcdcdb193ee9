//! Background tasks module
//!
//! This module contains the tick scheduling port and the background tasks
//! that react to timer changes.

pub mod notifier;
pub mod scheduler;

// Re-export main items
pub use notifier::{notifier_task, snapshot_log_task};
pub use scheduler::{ManualScheduler, Scheduler, TickCallback, TickHandle, TokioScheduler};
