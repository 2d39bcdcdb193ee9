use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use pomodoro_keeper::{
    clock::ManualClock,
    config::TimerConfig,
    state::{ControllerSettings, Phase, TimerController, TimerEvent, TimerState},
    storage::{JsonFileStore, MemoryStore, StateStore},
    tasks::ManualScheduler,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 16, 8, 30, 0).unwrap()
}

struct Harness {
    controller: Arc<TimerController>,
    scheduler: Arc<ManualScheduler>,
    clock: Arc<ManualClock>,
    store: Arc<MemoryStore>,
}

impl Harness {
    fn with_store(store: MemoryStore, settings: ControllerSettings) -> Self {
        let store = Arc::new(store);
        let scheduler = Arc::new(ManualScheduler::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let controller = TimerController::start(
            store.clone(),
            scheduler.clone(),
            clock.clone(),
            TimerConfig::default(),
            settings,
        );
        Self {
            controller,
            scheduler,
            clock,
            store,
        }
    }

    fn new() -> Self {
        Self::with_store(MemoryStore::new(), ControllerSettings::default())
    }

    /// Let the current phase run out and deliver the tick that notices it
    fn finish_phase(&self) {
        let remaining = self.controller.snapshot().time_remaining.ceil() as i64;
        self.clock.advance_secs(remaining);
        self.scheduler.tick();
    }
}

fn running_work(remaining: f64, last_update: DateTime<Utc>) -> TimerState {
    TimerState {
        current_phase: Phase::Work,
        time_remaining: remaining,
        total_time: 1500.0,
        completed_sessions: 0,
        is_running: true,
        last_update_time: last_update,
    }
}

#[test]
fn test_ticks_use_wall_clock_elapsed_time() {
    let h = Harness::new();
    h.controller.start_work_session();
    assert_eq!(h.scheduler.active_repeating(), 1);
    assert_eq!(h.scheduler.last_period(), Some(Duration::from_secs(1)));

    // Coalesced ticks: one callback after three seconds
    h.clock.advance_secs(3);
    h.scheduler.tick();
    assert_eq!(h.controller.snapshot().time_remaining, 1497.0);
    assert_eq!(h.store.stored().unwrap().time_remaining, 1497.0);
}

#[test]
fn test_work_completion_starts_break_after_delay() {
    let h = Harness::new();
    let mut events = h.controller.events();
    h.controller.start_work_session();

    h.finish_phase();
    let state = h.controller.snapshot();
    assert_eq!(state.completed_sessions, 1);
    assert!(!state.is_running);
    assert_eq!(state.current_phase, Phase::Work);
    assert_eq!(h.scheduler.active_repeating(), 0);
    assert_eq!(h.scheduler.pending_once(), 1);
    assert_eq!(h.scheduler.last_period(), Some(Duration::from_secs(1)));

    h.clock.advance_secs(1);
    h.scheduler.fire_pending();
    let state = h.controller.snapshot();
    assert_eq!(state.current_phase, Phase::ShortBreak);
    assert_eq!(state.time_remaining, 300.0);
    assert!(state.is_running);
    assert_eq!(h.scheduler.active_repeating(), 1);
    assert_eq!(h.store.stored().unwrap(), state);

    assert!(matches!(events.try_recv(), Ok(TimerEvent::PhaseStarted { phase: Phase::Work, .. })));
    assert_eq!(
        events.try_recv().unwrap(),
        TimerEvent::PhaseCompleted {
            phase: Phase::Work,
            completed_sessions: 1
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        TimerEvent::PhaseStarted {
            phase: Phase::ShortBreak,
            duration: 300.0
        }
    );
}

#[test]
fn test_break_completion_stops_timer() {
    let h = Harness::with_store(
        MemoryStore::new(),
        ControllerSettings {
            transition_delay: None,
            ..ControllerSettings::default()
        },
    );
    h.controller.start_work_session();
    h.finish_phase();
    assert_eq!(h.controller.snapshot().current_phase, Phase::ShortBreak);

    h.finish_phase();
    let state = h.controller.snapshot();
    assert_eq!(state.current_phase, Phase::Stopped);
    assert_eq!(state.completed_sessions, 1);
    assert!(!state.is_running);
    assert_eq!(h.scheduler.active_repeating(), 0);
    assert_eq!(h.store.stored().unwrap(), state);
}

#[test]
fn test_fourth_break_is_long() {
    let h = Harness::new();
    let mut breaks = Vec::new();

    for _ in 0..4 {
        h.controller.start_work_session();
        h.finish_phase();
        h.scheduler.fire_pending();
        breaks.push(h.controller.snapshot().current_phase);
        h.finish_phase();
        assert_eq!(h.controller.snapshot().current_phase, Phase::Stopped);
    }

    assert_eq!(
        breaks,
        vec![Phase::ShortBreak, Phase::ShortBreak, Phase::ShortBreak, Phase::LongBreak]
    );
    assert_eq!(h.controller.snapshot().completed_sessions, 4);
}

#[test]
fn test_reconcile_after_long_absence_completes_phase() {
    let store = MemoryStore::with_state(running_work(100.0, t0() - chrono::Duration::seconds(130)));
    let h = Harness::with_store(store, ControllerSettings::default());

    let state = h.controller.snapshot();
    assert_eq!(state.completed_sessions, 1);
    assert_eq!(state.time_remaining, 0.0);
    assert!(!state.is_running);
    assert_eq!(h.scheduler.active_repeating(), 0);

    h.scheduler.fire_pending();
    let state = h.controller.snapshot();
    assert_eq!(state.current_phase, Phase::ShortBreak);
    assert!(state.is_running);
    assert_eq!(state.time_remaining, 300.0);
    assert_eq!(h.scheduler.active_repeating(), 1);
}

#[test]
fn test_reconcile_without_delay_transitions_immediately() {
    let store = MemoryStore::with_state(running_work(100.0, t0() - chrono::Duration::seconds(130)));
    let h = Harness::with_store(
        store,
        ControllerSettings {
            transition_delay: None,
            ..ControllerSettings::default()
        },
    );

    let state = h.controller.snapshot();
    assert_eq!(state.current_phase, Phase::ShortBreak);
    assert_eq!(state.completed_sessions, 1);
    assert_eq!(h.store.stored().unwrap(), state);
}

#[test]
fn test_reconcile_short_absence_resumes_countdown() {
    let store = MemoryStore::with_state(running_work(100.0, t0() - chrono::Duration::seconds(30)));
    let h = Harness::with_store(store, ControllerSettings::default());

    let state = h.controller.snapshot();
    assert_eq!(state.current_phase, Phase::Work);
    assert_eq!(state.time_remaining, 70.0);
    assert!(state.is_running);
    assert_eq!(state.last_update_time, t0());
    assert_eq!(h.scheduler.active_repeating(), 1);
    assert_eq!(h.store.stored().unwrap().time_remaining, 70.0);

    h.clock.advance_secs(1);
    h.scheduler.tick();
    assert_eq!(h.controller.snapshot().time_remaining, 69.0);
}

#[test]
fn test_idle_state_loads_as_is() {
    let mut paused = running_work(420.0, t0() - chrono::Duration::hours(5));
    paused.is_running = false;
    paused.completed_sessions = 2;
    let h = Harness::with_store(MemoryStore::with_state(paused.clone()), ControllerSettings::default());

    assert_eq!(h.controller.snapshot(), paused);
    assert_eq!(h.scheduler.active_repeating(), 0);
}

#[test]
fn test_pause_resume_pair_restores_running_state() {
    let h = Harness::new();
    h.controller.start_work_session();
    h.clock.advance_secs(10);
    h.scheduler.tick();
    let before = h.controller.snapshot();

    let paused = h.controller.pause_resume();
    assert!(!paused.is_running);
    assert_eq!(h.scheduler.active_repeating(), 0);

    let resumed = h.controller.pause_resume();
    assert!(resumed.is_running);
    assert_eq!(resumed.time_remaining, before.time_remaining);
    assert_eq!(h.scheduler.active_repeating(), 1);
}

#[test]
fn test_paused_time_is_not_counted() {
    let h = Harness::new();
    h.controller.start_work_session();
    h.controller.pause_resume();

    h.clock.advance_secs(600);
    h.controller.pause_resume();
    h.clock.advance_secs(1);
    h.scheduler.tick();

    assert_eq!(h.controller.snapshot().time_remaining, 1499.0);
}

#[test]
fn test_pause_after_countdown_ran_out_completes_instead() {
    let h = Harness::new();
    let mut events = h.controller.events();
    h.controller.start_work_session();
    events.try_recv().unwrap();

    // No tick delivered before the pause request
    h.clock.advance_secs(1500);
    let state = h.controller.pause_resume();
    assert_eq!(state.current_phase, Phase::Work);
    assert_eq!(state.completed_sessions, 1);
    assert!(!state.is_running);
    assert_eq!(h.scheduler.pending_once(), 1);
    assert!(matches!(
        events.try_recv().unwrap(),
        TimerEvent::PhaseCompleted { phase: Phase::Work, .. }
    ));
    assert!(events.try_recv().is_err());

    h.scheduler.fire_pending();
    let state = h.controller.snapshot();
    assert_eq!(state.current_phase, Phase::ShortBreak);
    assert!(state.is_running);
}

#[test]
fn test_pause_during_transition_delay_starts_break_paused() {
    let h = Harness::new();
    h.controller.start_work_session();
    h.finish_phase();
    assert_eq!(h.scheduler.pending_once(), 1);

    let state = h.controller.pause_resume();
    assert_eq!(state.current_phase, Phase::ShortBreak);
    assert_eq!(state.time_remaining, 300.0);
    assert!(!state.is_running);
    assert_eq!(h.scheduler.pending_once(), 0);
    assert_eq!(h.scheduler.active_repeating(), 0);
    assert_eq!(h.store.stored().unwrap().current_phase, Phase::ShortBreak);

    let state = h.controller.pause_resume();
    assert!(state.is_running);
    assert_eq!(h.scheduler.active_repeating(), 1);
}

#[test]
fn test_pause_resume_when_stopped_is_noop_but_persists() {
    let h = Harness::new();
    let state = h.controller.pause_resume();
    assert_eq!(state.current_phase, Phase::Stopped);
    assert!(!state.is_running);
    assert_eq!(h.scheduler.active_repeating(), 0);
    assert_eq!(h.store.write_count(), 1);
}

#[test]
fn test_stop_during_pending_break_cancels_it() {
    let h = Harness::new();
    h.controller.start_work_session();
    h.finish_phase();
    assert_eq!(h.scheduler.pending_once(), 1);

    h.controller.stop();
    assert_eq!(h.scheduler.pending_once(), 0);
    assert_eq!(h.scheduler.fire_pending(), 0);

    let state = h.controller.snapshot();
    assert_eq!(state.current_phase, Phase::Stopped);
    assert_eq!(state.completed_sessions, 1);
}

#[test]
fn test_stop_keeps_sessions_and_reset_clears() {
    let h = Harness::new();
    h.controller.start_work_session();
    h.finish_phase();
    h.scheduler.fire_pending();

    let stopped = h.controller.stop();
    assert_eq!(stopped.completed_sessions, 1);
    assert_eq!(h.scheduler.active_repeating(), 0);

    let reset = h.controller.reset();
    assert_eq!(reset.completed_sessions, 0);
    assert_eq!(reset.current_phase, Phase::Stopped);
    assert_eq!(h.store.stored().unwrap(), reset);
}

#[test]
fn test_restarting_work_replaces_tick_source() {
    let h = Harness::new();
    h.controller.start_work_session();
    h.controller.start_work_session();
    h.controller.start_work_session();
    assert_eq!(h.scheduler.active_repeating(), 1);
}

#[test]
fn test_config_changes_apply_at_next_phase_start() {
    let h = Harness::new();
    h.controller.start_work_session();

    let mut custom = TimerConfig::default();
    custom.developer_mode = true;
    custom.work_duration = 60;
    custom.short_break_duration = 30;
    h.controller.update_config(custom).unwrap();
    assert_eq!(h.controller.snapshot().total_time, 1500.0);

    h.finish_phase();
    h.scheduler.fire_pending();
    assert_eq!(h.controller.snapshot().total_time, 30.0);

    h.controller.start_work_session();
    assert_eq!(h.controller.snapshot().total_time, 60.0);
}

#[test]
fn test_state_survives_restart_through_file_store() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));

    {
        let store: Arc<dyn StateStore> = Arc::new(JsonFileStore::new(temp_dir.path()));
        let controller = TimerController::start(
            store,
            Arc::new(ManualScheduler::new()),
            clock.clone(),
            TimerConfig::default(),
            ControllerSettings::default(),
        );
        controller.start_work_session();
        controller.shutdown();
    }

    clock.advance_secs(30);
    let scheduler = Arc::new(ManualScheduler::new());
    let controller = TimerController::start(
        Arc::new(JsonFileStore::new(temp_dir.path())),
        scheduler.clone(),
        clock.clone(),
        TimerConfig::default(),
        ControllerSettings::default(),
    );

    let state = controller.snapshot();
    assert_eq!(state.current_phase, Phase::Work);
    assert_eq!(state.time_remaining, 1470.0);
    assert!(state.is_running);
    assert_eq!(scheduler.active_repeating(), 1);
}

#[test]
fn test_pending_break_survives_shutdown() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));

    {
        let scheduler = Arc::new(ManualScheduler::new());
        let controller = TimerController::start(
            Arc::new(JsonFileStore::new(temp_dir.path())),
            scheduler.clone(),
            clock.clone(),
            TimerConfig::default(),
            ControllerSettings::default(),
        );
        controller.start_work_session();
        clock.advance_secs(1500);
        scheduler.tick();
        assert_eq!(scheduler.pending_once(), 1);
        // Process exits inside the transition delay
        controller.shutdown();
    }

    let scheduler = Arc::new(ManualScheduler::new());
    let controller = TimerController::start(
        Arc::new(JsonFileStore::new(temp_dir.path())),
        scheduler.clone(),
        clock.clone(),
        TimerConfig::default(),
        ControllerSettings::default(),
    );
    assert_eq!(controller.snapshot().completed_sessions, 1);
    assert_eq!(scheduler.pending_once(), 1);

    scheduler.fire_pending();
    let state = controller.snapshot();
    assert_eq!(state.current_phase, Phase::ShortBreak);
    assert_eq!(state.completed_sessions, 1);
    assert!(state.is_running);
}

#[test]
fn test_config_change_survives_restart() {
    use clap::Parser;
    use pomodoro_keeper::config::Config;

    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp_dir.path());
    let controller = TimerController::start(
        Arc::new(store.clone()),
        Arc::new(ManualScheduler::new()),
        Arc::new(ManualClock::new(t0())),
        TimerConfig::default(),
        ControllerSettings::default(),
    );
    let mut config = TimerConfig::default();
    config.developer_mode = true;
    config.work_duration = 600;
    controller.update_config(config).unwrap();
    controller.shutdown();

    let reopened = JsonFileStore::new(temp_dir.path());
    let stored = reopened.load_config().unwrap();
    let cli = Config::parse_from(["pomodoro-keeper"]);
    let restored = cli.timer_config(stored).unwrap();
    assert_eq!(restored, config);

    let scheduler = Arc::new(ManualScheduler::new());
    let controller = TimerController::start(
        Arc::new(reopened),
        scheduler,
        Arc::new(ManualClock::new(t0())),
        restored,
        ControllerSettings::default(),
    );
    assert_eq!(controller.start_work_session().total_time, 600.0);
}

#[test]
fn test_corrupt_storage_starts_clean() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("TimerState.json"), "garbage").unwrap();

    let scheduler = Arc::new(ManualScheduler::new());
    let controller = TimerController::start(
        Arc::new(JsonFileStore::new(temp_dir.path())),
        scheduler.clone(),
        Arc::new(ManualClock::new(t0())),
        TimerConfig::default(),
        ControllerSettings::default(),
    );

    assert_eq!(controller.snapshot(), TimerState::new(t0()));
    assert_eq!(scheduler.active_repeating(), 0);
}
