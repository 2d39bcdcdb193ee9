//! JSON file backed state and configuration store

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use super::{StateStore, CONFIG_KEY, STATE_KEY};
use crate::{config::TimerConfig, error::PomodoroError, state::TimerState};

/// Stores the record as `<dir>/TimerState.json`, optionally mirrored to a
/// shared file that companion processes read, and the configuration as
/// `<dir>/TimerConfig.json`. This store is the only writer of all of them.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    config_path: PathBuf,
    shared_path: Option<PathBuf>,
}

impl JsonFileStore {
    /// Create a store inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STATE_KEY)),
            config_path: dir.as_ref().join(format!("{}.json", CONFIG_KEY)),
            shared_path: None,
        }
    }

    /// Also mirror every save to `path`
    pub fn with_shared(mut self, path: impl Into<PathBuf>) -> Self {
        self.shared_path = Some(path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shared_path(&self) -> Option<&Path> {
        self.shared_path.as_deref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<TimerState>, PomodoroError> {
        if !self.path.exists() {
            debug!("No persisted state at {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| PomodoroError::read(STATE_KEY, e))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                backup_corrupted_file(&self.path);
                Err(PomodoroError::read(STATE_KEY, e))
            }
        }
    }

    fn save(&self, state: &TimerState) -> Result<(), PomodoroError> {
        let content = serde_json::to_string_pretty(state).map_err(|e| PomodoroError::write(STATE_KEY, e))?;

        write_atomic(STATE_KEY, &self.path, &content)?;
        if let Some(shared) = &self.shared_path {
            write_atomic(STATE_KEY, shared, &content)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), PomodoroError> {
        let paths = std::iter::once(&self.path).chain(self.shared_path.iter());
        for path in paths {
            if path.exists() {
                fs::remove_file(path).map_err(|e| PomodoroError::write(STATE_KEY, e))?;
            }
        }
        Ok(())
    }

    fn load_config(&self) -> Result<Option<TimerConfig>, PomodoroError> {
        if !self.config_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.config_path).map_err(|e| PomodoroError::read(CONFIG_KEY, e))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let config: TimerConfig = serde_json::from_str(&content).map_err(|e| PomodoroError::read(CONFIG_KEY, e))?;
        config.validate()?;
        Ok(Some(config))
    }

    fn save_config(&self, config: &TimerConfig) -> Result<(), PomodoroError> {
        let content = serde_json::to_string_pretty(config).map_err(|e| PomodoroError::write(CONFIG_KEY, e))?;
        write_atomic(CONFIG_KEY, &self.config_path, &content)
    }
}

/// Write through a temp file so readers never see a half-written record
fn write_atomic(key: &str, path: &Path, content: &str) -> Result<(), PomodoroError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PomodoroError::write(key, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| PomodoroError::write(key, e))?;
    fs::rename(&tmp, path).map_err(|e| PomodoroError::write(key, e))
}

/// Move an undecodable file aside so the next save starts clean
fn backup_corrupted_file(path: &Path) {
    let backup_path = path.with_extension("json.backup");
    match fs::rename(path, &backup_path) {
        Ok(()) => info!("Corrupted timer state backed up to {}", backup_path.display()),
        Err(e) => warn!(
            "Failed to back up corrupted file {} to {}: {}",
            path.display(),
            backup_path.display(),
            e
        ),
    }
}
