//! In-memory state store

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex,
};

use super::{StateStore, CONFIG_KEY, STATE_KEY};
use crate::{config::TimerConfig, error::PomodoroError, state::TimerState};

/// Keeps the records in memory; optionally fails on demand for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<TimerState>>,
    config: Mutex<Option<TimerConfig>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a record
    pub fn with_state(state: TimerState) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(state);
        store
    }

    /// Last successfully saved record
    pub fn stored(&self) -> Option<TimerState> {
        self.record.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Last successfully saved configuration
    pub fn stored_config(&self) -> Option<TimerConfig> {
        *self.config.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of successful state saves
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<TimerState>, PomodoroError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PomodoroError::read(STATE_KEY, "storage unavailable"));
        }
        Ok(self.stored())
    }

    fn save(&self, state: &TimerState) -> Result<(), PomodoroError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PomodoroError::write(STATE_KEY, "storage unavailable"));
        }
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), PomodoroError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }

    fn load_config(&self) -> Result<Option<TimerConfig>, PomodoroError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PomodoroError::read(CONFIG_KEY, "storage unavailable"));
        }
        Ok(self.stored_config())
    }

    fn save_config(&self, config: &TimerConfig) -> Result<(), PomodoroError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PomodoroError::write(CONFIG_KEY, "storage unavailable"));
        }
        *self.config.lock().unwrap_or_else(|e| e.into_inner()) = Some(*config);
        Ok(())
    }
}
