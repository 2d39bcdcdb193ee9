//! Scheduling port for tick sources

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{
    runtime::Handle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Work run by a scheduled tick
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Something that can run callbacks later
pub trait Scheduler: Send + Sync {
    /// Run `callback` every `interval`, first after one full interval
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TickHandle;

    /// Run `callback` once after `delay`
    fn schedule_once(&self, delay: Duration, callback: TickCallback) -> TickHandle;
}

/// Cancels a scheduled callback. Dropping the handle cancels as well.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the callback from running again. Safe to call more than once.
    pub fn cancel(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Production scheduler running callbacks on tokio tasks
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TickHandle {
        debug!("Scheduling tick source every {:?}", interval);
        let task = self.handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            // After a stall fire once and realign; elapsed time is measured, not counted
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        TickHandle::new(move || task.abort())
    }

    fn schedule_once(&self, delay: Duration, callback: TickCallback) -> TickHandle {
        debug!("Scheduling one-shot callback in {:?}", delay);
        let task = self.handle.spawn(async move {
            sleep(delay).await;
            callback();
        });
        TickHandle::new(move || task.abort())
    }
}

#[derive(Clone)]
struct Entry {
    id: u64,
    repeating: bool,
    period: Duration,
    callback: TickCallback,
    cancelled: Arc<AtomicBool>,
}

/// Deterministic scheduler: nothing runs until the caller fires it
#[derive(Default)]
pub struct ManualScheduler {
    entries: Arc<Mutex<Vec<Entry>>>,
    next_id: AtomicU64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live repeating callback once. Returns how many ran.
    pub fn tick(&self) -> usize {
        let due: Vec<Entry> = self.lock().iter().filter(|e| e.repeating).cloned().collect();
        Self::run(due)
    }

    /// Fire and retire every pending one-shot callback. Returns how many ran.
    pub fn fire_pending(&self) -> usize {
        let due: Vec<Entry> = {
            let mut entries = self.lock();
            let (once, rest): (Vec<Entry>, Vec<Entry>) = entries.drain(..).partition(|e| !e.repeating);
            *entries = rest;
            once
        };
        Self::run(due)
    }

    /// Number of live repeating callbacks
    pub fn active_repeating(&self) -> usize {
        self.lock().iter().filter(|e| e.repeating).count()
    }

    /// Number of one-shot callbacks waiting to fire
    pub fn pending_once(&self) -> usize {
        self.lock().iter().filter(|e| !e.repeating).count()
    }

    /// Period or delay of the most recently registered callback
    pub fn last_period(&self) -> Option<Duration> {
        self.lock().last().map(|e| e.period)
    }

    fn run(due: Vec<Entry>) -> usize {
        let mut ran = 0;
        for entry in due {
            // An earlier callback in this batch may have cancelled this one
            if entry.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            (entry.callback)();
            ran += 1;
        }
        ran
    }

    fn register(&self, repeating: bool, period: Duration, callback: TickCallback) -> TickHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.lock().push(Entry {
            id,
            repeating,
            period,
            callback,
            cancelled: Arc::clone(&cancelled),
        });

        let entries = Arc::clone(&self.entries);
        TickHandle::new(move || {
            cancelled.store(true, Ordering::SeqCst);
            entries
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|e| e.id != id);
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TickHandle {
        self.register(true, interval, callback)
    }

    fn schedule_once(&self, delay: Duration, callback: TickCallback) -> TickHandle {
        self.register(false, delay, callback)
    }
}
