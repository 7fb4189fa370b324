// Runtime metrics
//
// Lightweight counters for the timer loop, logged on shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide counters.
///
/// Uses atomic operations so collaborators running on other tasks can
/// record without locks.
#[derive(Debug)]
pub struct Metrics {
    /// Ticks applied by the engine while running
    pub ticks_processed: AtomicU64,

    /// Work sessions completed during this run
    pub sessions_completed: AtomicU64,

    /// Events delivered to at least one subscriber
    pub events_broadcast: AtomicU64,

    /// Events emitted while nobody was subscribed
    pub events_unobserved: AtomicU64,

    /// Successful key-value store writes
    pub store_writes: AtomicU64,

    /// Failed key-value store writes
    pub store_write_errors: AtomicU64,

    /// Replies produced by the coach
    pub coach_replies: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            ticks_processed: AtomicU64::new(0),
            sessions_completed: AtomicU64::new(0),
            events_broadcast: AtomicU64::new(0),
            events_unobserved: AtomicU64::new(0),
            store_writes: AtomicU64::new(0),
            store_write_errors: AtomicU64::new(0),
            coach_replies: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_tick(&self) {
        self.ticks_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_completed(&self) {
        self.sessions_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_broadcast(&self) {
        self.events_broadcast.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_unobserved(&self) {
        self.events_unobserved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_write(&self) {
        self.store_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_write_error(&self) {
        self.store_write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coach_reply(&self) {
        self.coach_replies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Share of uptime spent with the timer running, in `[0, 1]`.
    pub fn running_ratio(&self) -> f64 {
        let uptime = self.uptime().as_secs_f64();
        if uptime > 0.0 {
            (self.ticks_processed.load(Ordering::Relaxed) as f64 / uptime).min(1.0)
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Focus Timer Metrics Summary ===");
        tracing::info!(
            "Uptime: {:.2}s, running {:.0}% of the time",
            self.uptime().as_secs_f64(),
            self.running_ratio() * 100.0
        );
        tracing::info!(
            "Ticks: {}, work sessions completed: {}",
            self.ticks_processed.load(Ordering::Relaxed),
            self.sessions_completed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Events: {} broadcast, {} unobserved",
            self.events_broadcast.load(Ordering::Relaxed),
            self.events_unobserved.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Store writes: {}, errors: {}, coach replies: {}",
            self.store_writes.load(Ordering::Relaxed),
            self.store_write_errors.load(Ordering::Relaxed),
            self.coach_replies.load(Ordering::Relaxed)
        );
    }

    /// Log periodic metrics (alongside each store flush)
    pub fn log_periodic(&self) {
        tracing::debug!(
            "Metrics: {} ticks, {} sessions, {} events, uptime {:.0}s",
            self.ticks_processed.load(Ordering::Relaxed),
            self.sessions_completed.load(Ordering::Relaxed),
            self.events_broadcast.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
