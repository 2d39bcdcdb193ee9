//! External side effects module
//!
//! This module contains functions that reach outside the process, such as
//! running the user's notification hook.

pub mod notify;

// Re-export main functions
pub use notify::*;
