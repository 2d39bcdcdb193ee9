//! Timer controller: drives the countdown, applies the phase policy and
//! keeps persisted state in step with memory.

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{Phase, TimerEvent, TimerState};
use crate::{
    clock::Clock,
    config::TimerConfig,
    error::PomodoroError,
    storage::StateStore,
    tasks::scheduler::{Scheduler, TickCallback, TickHandle},
};

/// Timing knobs that are not part of the phase configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Cadence of the tick source
    pub tick_interval: Duration,
    /// Pause between a finished work session and the break, `None` for instant
    pub transition_delay: Option<Duration>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            transition_delay: Some(Duration::from_secs(1)),
        }
    }
}

struct Inner {
    state: TimerState,
    config: TimerConfig,
    /// The one live tick source or pending break, if any
    tick: Option<TickHandle>,
    /// Bumped on every cancel; callbacks from older generations are ignored
    generation: u64,
}

/// Owns the [`TimerState`] and is its only writer
pub struct TimerController {
    inner: Mutex<Inner>,
    store: Arc<dyn StateStore>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    settings: ControllerSettings,
    /// Snapshot pushed after every mutation
    snapshot_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerState>,
    event_tx: broadcast::Sender<TimerEvent>,
    this: Weak<TimerController>,
}

impl TimerController {
    /// Load persisted state and reconcile it in one step
    pub fn start(
        store: Arc<dyn StateStore>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        config: TimerConfig,
        settings: ControllerSettings,
    ) -> Arc<Self> {
        let controller = Self::new(store, scheduler, clock, config, settings);
        controller.recover();
        controller
    }

    /// Load persisted state without reconciling it yet, so listeners can
    /// subscribe before [`recover`](Self::recover) emits anything.
    pub fn new(
        store: Arc<dyn StateStore>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
        config: TimerConfig,
        settings: ControllerSettings,
    ) -> Arc<Self> {
        let state = load_state(store.as_ref(), clock.now());
        let (snapshot_tx, snapshot_rx) = watch::channel(state.clone());
        let (event_tx, _) = broadcast::channel(64);

        Arc::new_cyclic(|this| Self {
            inner: Mutex::new(Inner {
                state,
                config,
                tick: None,
                generation: 0,
            }),
            store,
            scheduler,
            clock,
            settings,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
            event_tx,
            this: this.clone(),
        })
    }

    /// Account for time that passed while the process was not running
    pub fn recover(&self) {
        let mut inner = self.lock();
        if !inner.state.is_running {
            info!(
                "Loaded idle timer: phase={}, remaining={}, sessions={}",
                inner.state.current_phase,
                inner.state.formatted_remaining(),
                inner.state.completed_sessions
            );
            return;
        }

        let now = self.clock.now();
        let elapsed = inner.state.elapsed_since_update(now);
        inner.state.tick_by(elapsed, now);
        info!(
            "Reconciled running {} phase: {:.0}s elapsed since last update, {} left",
            inner.state.current_phase,
            elapsed,
            inner.state.formatted_remaining()
        );

        if inner.state.is_expired() {
            info!("{} phase finished while the timer was inactive", inner.state.current_phase);
            self.handle_completion(&mut inner, now);
        } else {
            self.commit(&inner.state);
            self.start_ticking(&mut inner);
        }
    }

    /// Begin a fresh work session, abandoning whatever was running
    pub fn start_work_session(&self) -> TimerState {
        let mut inner = self.lock();
        let now = self.clock.now();
        self.cancel_tick(&mut inner);

        let config = inner.config.effective();
        inner.state.start_work_session(&config, now);
        info!("Work session started ({}s)", inner.state.total_time);

        self.commit(&inner.state);
        self.start_ticking(&mut inner);
        self.emit(TimerEvent::PhaseStarted {
            phase: Phase::Work,
            duration: inner.state.total_time,
        });
        inner.state.clone()
    }

    /// Pause a running countdown or resume a paused one
    pub fn pause_resume(&self) -> TimerState {
        let mut inner = self.lock();
        let now = self.clock.now();

        if inner.state.is_running {
            self.cancel_tick(&mut inner);
            let elapsed = inner.state.elapsed_since_update(now);
            inner.state.tick_by(elapsed, now);
            if inner.state.is_expired() {
                self.handle_completion(&mut inner, now);
                return inner.state.clone();
            }

            inner.state.pause(now);
            info!("Timer paused at {}", inner.state.formatted_remaining());
            self.commit(&inner.state);
            self.emit(TimerEvent::Paused);
        } else if inner.state.awaiting_break() {
            // Pausing inside the transition delay: the break starts, paused
            self.cancel_tick(&mut inner);
            let config = inner.config.effective();
            inner.state.start_break(&config, now);
            inner.state.pause(now);
            info!("{} started paused", inner.state.current_phase);
            self.commit(&inner.state);
            self.emit(TimerEvent::PhaseStarted {
                phase: inner.state.current_phase,
                duration: inner.state.total_time,
            });
            self.emit(TimerEvent::Paused);
        } else if inner.state.resume(now) {
            info!("Timer resumed at {}", inner.state.formatted_remaining());
            self.commit(&inner.state);
            self.start_ticking(&mut inner);
            self.emit(TimerEvent::Resumed);
        } else {
            debug!("Nothing to resume in phase {}", inner.state.current_phase);
            self.commit(&inner.state);
        }
        inner.state.clone()
    }

    /// Halt the timer, keeping completed sessions
    pub fn stop(&self) -> TimerState {
        let mut inner = self.lock();
        let now = self.clock.now();
        self.cancel_tick(&mut inner);

        inner.state.stop(now);
        info!("Timer stopped ({} sessions completed)", inner.state.completed_sessions);
        self.commit(&inner.state);
        self.emit(TimerEvent::Stopped);
        inner.state.clone()
    }

    /// Halt the timer and clear the session count
    pub fn reset(&self) -> TimerState {
        let mut inner = self.lock();
        let now = self.clock.now();
        self.cancel_tick(&mut inner);

        inner.state.reset(now);
        info!("Timer reset");
        self.commit(&inner.state);
        self.emit(TimerEvent::Reset);
        inner.state.clone()
    }

    /// Replace the phase configuration. Takes effect at the next phase start.
    pub fn update_config(&self, config: TimerConfig) -> Result<TimerConfig, PomodoroError> {
        if let Err(e) = config.validate() {
            warn!("Rejected configuration change: {}", e);
            return Err(e);
        }

        let mut inner = self.lock();
        inner.config = config;
        if let Err(e) = self.store.save_config(&config) {
            warn!("{}", e);
        }
        info!(
            "Configuration updated: developer_mode={}, work={}s, short={}s, long={}s, every {} sessions",
            config.developer_mode,
            config.work_duration,
            config.short_break_duration,
            config.long_break_duration,
            config.sessions_until_long_break
        );
        drop(inner);

        self.emit(TimerEvent::ConfigChanged);
        Ok(config)
    }

    /// Stop the tick source without touching state. The persisted record
    /// keeps `isRunning`, so the next start reconciles the gap.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        self.cancel_tick(&mut inner);
        self.persist(&inner.state);
        info!("Timer controller shut down");
    }

    /// Current state
    pub fn snapshot(&self) -> TimerState {
        self.lock().state.clone()
    }

    /// Stored configuration (see [`TimerConfig::effective`] for what is in force)
    pub fn config(&self) -> TimerConfig {
        self.lock().config
    }

    /// Receive a snapshot after every mutation
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.snapshot_tx.subscribe()
    }

    /// Receive transition events
    pub fn events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    fn tick(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation || !inner.state.is_running {
            debug!("Ignoring stale tick (generation {})", generation);
            return;
        }

        let now = self.clock.now();
        let elapsed = inner.state.elapsed_since_update(now);
        inner.state.tick_by(elapsed, now);

        if inner.state.is_expired() {
            self.handle_completion(&mut inner, now);
        } else {
            self.commit(&inner.state);
        }
    }

    fn handle_completion(&self, inner: &mut Inner, now: DateTime<Utc>) {
        self.cancel_tick(inner);

        let ended = inner.state.current_phase;
        inner.state.complete_session();

        match ended {
            Phase::Work => {
                info!("Work session complete ({} total)", inner.state.completed_sessions);
                // Not persisted (see `persist`): if the process dies before the
                // break starts, the stored running record reconciles to this
                // same completion.
                self.publish(&inner.state);
                self.emit(TimerEvent::PhaseCompleted {
                    phase: ended,
                    completed_sessions: inner.state.completed_sessions,
                });

                match self.settings.transition_delay {
                    Some(delay) if !delay.is_zero() => {
                        let generation = inner.generation;
                        let this = self.this.clone();
                        let callback: TickCallback = Arc::new(move || {
                            if let Some(controller) = this.upgrade() {
                                controller.begin_break(generation);
                            }
                        });
                        inner.tick = Some(self.scheduler.schedule_once(delay, callback));
                    }
                    _ => self.start_break(inner, now),
                }
            }
            Phase::ShortBreak | Phase::LongBreak => {
                info!("{} complete, waiting for the next work session", ended);
                self.emit(TimerEvent::PhaseCompleted {
                    phase: ended,
                    completed_sessions: inner.state.completed_sessions,
                });
                inner.state.stop(now);
                self.commit(&inner.state);
            }
            Phase::Stopped => {
                debug!("Completion requested while stopped");
            }
        }
    }

    fn begin_break(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!("Pending break was cancelled");
            return;
        }
        let now = self.clock.now();
        self.start_break(&mut inner, now);
    }

    fn start_break(&self, inner: &mut Inner, now: DateTime<Utc>) {
        let config = inner.config.effective();
        inner.state.start_break(&config, now);
        info!(
            "{} started ({}s) after {} sessions",
            inner.state.current_phase, inner.state.total_time, inner.state.completed_sessions
        );

        self.commit(&inner.state);
        self.start_ticking(inner);
        self.emit(TimerEvent::PhaseStarted {
            phase: inner.state.current_phase,
            duration: inner.state.total_time,
        });
    }

    fn start_ticking(&self, inner: &mut Inner) {
        self.cancel_tick(inner);
        let generation = inner.generation;
        let this = self.this.clone();
        let callback: TickCallback = Arc::new(move || {
            if let Some(controller) = this.upgrade() {
                controller.tick(generation);
            }
        });
        inner.tick = Some(self.scheduler.schedule(self.settings.tick_interval, callback));
    }

    fn cancel_tick(&self, inner: &mut Inner) {
        inner.generation = inner.generation.wrapping_add(1);
        if let Some(handle) = inner.tick.take() {
            handle.cancel();
        }
    }

    fn commit(&self, state: &TimerState) {
        self.persist(state);
        self.publish(state);
    }

    fn persist(&self, state: &TimerState) {
        // Keep the last running record: it reconciles to the same completion
        if state.awaiting_break() {
            debug!("Break pending, keeping the last running record");
            return;
        }
        // In-memory state stays authoritative; the next mutation retries
        if let Err(e) = self.store.save(state) {
            warn!("{}", e);
        }
    }

    fn publish(&self, state: &TimerState) {
        if let Err(e) = self.snapshot_tx.send(state.clone()) {
            warn!("Failed to send timer snapshot: {}", e);
        }
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No event listeners");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Read the stored record, falling back to a stopped timer on any failure
fn load_state(store: &dyn StateStore, now: DateTime<Utc>) -> TimerState {
    match store.load() {
        Ok(Some(state)) => {
            debug!("Loaded persisted timer state");
            state.sanitized()
        }
        Ok(None) => {
            info!("No persisted timer state, starting fresh");
            TimerState::new(now)
        }
        Err(e) => {
            warn!("{}; starting from a stopped timer", e);
            TimerState::new(now)
        }
    }
}
