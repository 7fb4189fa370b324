// Tick registration
//
// The engine never owns a timer itself. It asks a TickScheduler for a
// registration when it starts and drops the returned TickGuard when it
// stops, so at most one tick source is ever live per engine.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Handle to an active one-second tick registration.
///
/// Dropping the guard cancels the registration before `drop` returns.
pub struct TickGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickGuard {
    /// Wrap the function that tears the registration down.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the registration now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TickGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickGuard")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Source of the periodic tick that drives [`TimerEngine::tick`](super::TimerEngine::tick).
///
/// Implementations deliver one tick per second until the guard is dropped.
pub trait TickScheduler: Send {
    fn acquire(&mut self) -> TickGuard;
}

/// Scheduler for hosts that call `tick()` themselves.
///
/// Tracks how many registrations are live so tests can check that the
/// engine never holds more than one.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    active: Arc<AtomicUsize>,
    acquisitions: Arc<AtomicUsize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrations currently held.
    pub fn active_registrations(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Registrations handed out since creation.
    pub fn total_acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl TickScheduler for ManualScheduler {
    fn acquire(&mut self) -> TickGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        let active = Arc::clone(&self.active);
        TickGuard::new(move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
