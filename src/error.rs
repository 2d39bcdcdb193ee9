//! Error types for the timer core

use thiserror::Error;

/// Errors produced by the timer core and its ports.
///
/// None of these are fatal: persistence failures are logged and swallowed by
/// the controller, configuration failures are handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PomodoroError {
    /// Stored state was missing, corrupt or could not be decoded
    #[error("Failed to read persisted state '{key}': {reason}")]
    PersistenceRead { key: String, reason: String },
    /// Stored state could not be written
    #[error("Failed to write persisted state '{key}': {reason}")]
    PersistenceWrite { key: String, reason: String },
    /// A configuration value was rejected
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },
    /// The front-end received a command it does not understand
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl PomodoroError {
    pub fn read(key: &str, reason: impl ToString) -> Self {
        Self::PersistenceRead {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(key: &str, reason: impl ToString) -> Self {
        Self::PersistenceWrite {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(field: &str, reason: impl ToString) -> Self {
        Self::InvalidConfiguration {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
