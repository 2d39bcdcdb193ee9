//! Timer state structure and its pure transitions
//!
//! Nothing in here touches the clock, storage or the scheduler. Every
//! operation receives "now" from the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Phase;
use crate::config::TimerConfig;

/// The single persisted aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Active interval, or `Stopped`
    pub current_phase: Phase,
    /// Countdown value in seconds
    pub time_remaining: f64,
    /// Length of the current phase in seconds, fixed when it started
    pub total_time: f64,
    /// Completed work phases since the last reset
    pub completed_sessions: u32,
    /// Whether the countdown is ticking
    pub is_running: bool,
    /// Instant of the last mutation
    pub last_update_time: DateTime<Utc>,
}

impl TimerState {
    /// A stopped timer with no completed sessions
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_phase: Phase::Stopped,
            time_remaining: 0.0,
            total_time: 0.0,
            completed_sessions: 0,
            is_running: false,
            last_update_time: now,
        }
    }

    pub fn start_work_session(&mut self, config: &TimerConfig, now: DateTime<Utc>) {
        self.begin(Phase::Work, config, now);
    }

    /// Start a short or long break depending on the session count
    pub fn start_break(&mut self, config: &TimerConfig, now: DateTime<Utc>) {
        let phase = if self.is_long_break_due(config) {
            Phase::LongBreak
        } else {
            Phase::ShortBreak
        };
        self.begin(phase, config, now);
    }

    /// Whether the next break should be a long one
    pub fn is_long_break_due(&self, config: &TimerConfig) -> bool {
        let cadence = config.sessions_until_long_break.max(1);
        self.completed_sessions > 0 && self.completed_sessions % cadence == 0
    }

    fn begin(&mut self, phase: Phase, config: &TimerConfig, now: DateTime<Utc>) {
        let duration = phase.duration(config).max(0.0);
        self.current_phase = phase;
        self.time_remaining = duration;
        self.total_time = duration;
        self.is_running = duration > 0.0;
        self.last_update_time = now;
    }

    /// Record that the countdown hit zero. The phase is left as is.
    pub fn complete_session(&mut self) {
        if self.current_phase == Phase::Work {
            self.completed_sessions += 1;
        }
        self.is_running = false;
    }

    /// Halt the timer, keeping the session count
    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.current_phase = Phase::Stopped;
        self.time_remaining = 0.0;
        self.total_time = 0.0;
        self.is_running = false;
        self.last_update_time = now;
    }

    /// Halt the timer and forget completed sessions
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.stop(now);
        self.completed_sessions = 0;
    }

    /// Subtract elapsed seconds, floored at zero
    pub fn tick_by(&mut self, delta_seconds: f64, now: DateTime<Utc>) {
        self.time_remaining = (self.time_remaining - delta_seconds.max(0.0)).max(0.0);
        self.last_update_time = now;
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.is_running = false;
        self.last_update_time = now;
    }

    /// Restart the countdown. Returns false when there is nothing to resume.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.current_phase == Phase::Stopped || self.time_remaining <= 0.0 {
            return false;
        }
        self.is_running = true;
        // Paused time must not be counted by the next tick
        self.last_update_time = now;
        true
    }

    /// Seconds since the last mutation, zero if the clock went backwards
    pub fn elapsed_since_update(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.last_update_time).num_milliseconds();
        (millis as f64 / 1000.0).max(0.0)
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining <= 0.0
    }

    /// A work session has run out but its break has not started yet
    pub fn awaiting_break(&self) -> bool {
        self.current_phase == Phase::Work && !self.is_running && self.is_expired() && self.total_time > 0.0
    }

    /// Fraction of the current phase already elapsed, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.total_time <= 0.0 {
            return 0.0;
        }
        (1.0 - self.time_remaining / self.total_time).clamp(0.0, 1.0)
    }

    pub fn remaining_whole_seconds(&self) -> u64 {
        self.time_remaining.max(0.0).floor() as u64
    }

    /// Remaining time as zero-padded `mm:ss`
    pub fn formatted_remaining(&self) -> String {
        let secs = self.remaining_whole_seconds();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Repair loaded data so the aggregate invariants hold again
    pub fn sanitized(mut self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.total_time = finite_or_zero(self.total_time);
        self.time_remaining = finite_or_zero(self.time_remaining).min(self.total_time);

        if self.current_phase == Phase::Stopped {
            self.time_remaining = 0.0;
            self.total_time = 0.0;
            self.is_running = false;
        }
        self
    }
}
