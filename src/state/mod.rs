// Timer state machine
//
// This module provides the TimerEngine which owns the focus timer state,
// advances it one tick at a time and broadcasts lifecycle events to any
// number of subscribers (display, notifier, coach, persistence).

pub mod scheduler;

pub use scheduler::{ManualScheduler, TickGuard, TickScheduler};

use crate::metrics::Metrics;
use crate::models::{Mode, TimerConfig, TimerError, TimerState};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Events emitted by the engine.
///
/// Every mutating operation returns the events it emitted, in order, and
/// also sends them on the broadcast channel returned by
/// [`TimerEngine::subscribe`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The tick source was acquired
    Started { mode: Mode, remaining_seconds: u64 },

    /// One second elapsed while running
    Tick { remaining_seconds: u64 },

    /// The running session crossed half of its full duration
    HalfwayPoint { mode: Mode },

    /// A session ran down to zero.
    ///
    /// `sessions_completed` already includes this session when `mode` is work.
    SessionComplete { mode: Mode, sessions_completed: u64 },

    /// The active mode changed (automatic or manual)
    ModeChanged { mode: Mode },

    /// The tick source was released
    Paused { mode: Mode, remaining_seconds: u64 },

    /// The current session was rewound to its full duration
    Reset { mode: Mode, remaining_seconds: u64 },

    /// New durations were accepted
    SettingsChanged { config: TimerConfig },
}

/// Halfway notification tracking for the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Halfway {
    /// No session started from its full duration yet
    Idle,
    /// Fires on the first running tick at or below `threshold`
    Armed { threshold: u64 },
    Fired,
}

/// The focus timer state machine.
///
/// Owns mode, remaining time, session count and durations. The running flag
/// is derived from the tick registration: the engine is running exactly when
/// it holds a [`TickGuard`], so two tick sources can never be live at once.
///
/// # Halfway policy
///
/// The halfway threshold is `floor(full / 2)`, armed when a session starts
/// from its full duration and checked on every tick. It survives
/// pause/resume, fires at most once per session, and is cleared whenever
/// the remaining time is rewound to full.
///
/// # Usage
///
/// ```ignore
/// let mut engine = TimerEngine::new(TimerConfig::default(), 0, ManualScheduler::new())?;
/// let mut rx = engine.subscribe();
/// engine.start();
/// engine.tick();
/// ```
pub struct TimerEngine {
    config: TimerConfig,
    mode: Mode,
    remaining_seconds: u64,
    sessions_completed: u64,

    scheduler: Box<dyn TickScheduler>,
    tick_guard: Option<TickGuard>,
    halfway: Halfway,

    /// Broadcast channel for lifecycle events, buffer of 100
    event_tx: broadcast::Sender<TimerEvent>,

    metrics: Arc<Metrics>,
}

impl TimerEngine {
    /// Create an engine in work mode with the full work duration remaining.
    ///
    /// Fails with [`TimerError::InvalidConfig`] if any duration is zero.
    pub fn new<S>(
        config: TimerConfig,
        sessions_completed: u64,
        scheduler: S,
    ) -> Result<Self, TimerError>
    where
        S: TickScheduler + 'static,
    {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(100);

        Ok(Self {
            config,
            mode: Mode::Work,
            remaining_seconds: config.duration_secs(Mode::Work),
            sessions_completed,
            scheduler: Box::new(scheduler),
            tick_guard: None,
            halfway: Halfway::Idle,
            event_tx,
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Create an engine with the 25/5/15 defaults and no completed sessions.
    pub fn with_defaults<S>(scheduler: S) -> Self
    where
        S: TickScheduler + 'static,
    {
        let (event_tx, _) = broadcast::channel(100);
        let config = TimerConfig::default();

        Self {
            config,
            mode: Mode::Work,
            remaining_seconds: config.duration_secs(Mode::Work),
            sessions_completed: 0,
            scheduler: Box::new(scheduler),
            tick_guard: None,
            halfway: Halfway::Idle,
            event_tx,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Share a metrics instance with the host.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Subscribe to lifecycle events.
    ///
    /// Each receiver sees every event emitted after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.tick_guard.is_some()
    }

    pub fn sessions_completed(&self) -> u64 {
        self.sessions_completed
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Full duration of the current mode in seconds.
    pub fn full_duration(&self) -> u64 {
        self.config.duration_secs(self.mode)
    }

    pub fn snapshot(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            remaining_seconds: self.remaining_seconds,
            running: self.is_running(),
            sessions_completed: self.sessions_completed,
        }
    }

    /// Elapsed share of the current session, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.full_duration();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_seconds);
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Acquire the tick source. No-op while running.
    pub fn start(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.start_into(&mut events);
        events
    }

    /// Release the tick source. No-op while paused.
    pub fn pause(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.pause_into(&mut events);
        events
    }

    /// Pause if running, start otherwise.
    pub fn toggle(&mut self) -> Vec<TimerEvent> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Pause and rewind the current mode to its full duration.
    ///
    /// Mode and session count are unchanged.
    pub fn reset(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.pause_into(&mut events);
        self.rewind();
        tracing::debug!("Timer reset to {}s in {}", self.remaining_seconds, self.mode);

        self.emit(
            TimerEvent::Reset {
                mode: self.mode,
                remaining_seconds: self.remaining_seconds,
            },
            &mut events,
        );
        events
    }

    /// Advance the running session by one second.
    ///
    /// A tick delivered while paused (e.g. already queued when the
    /// registration was cancelled) is ignored. When the session reaches
    /// zero, `SessionComplete` is emitted and the session is completed in
    /// the same call; nothing else is decremented for that tick.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if !self.is_running() {
            tracing::trace!("Ignoring tick while paused");
            return events;
        }

        self.metrics.record_tick();
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.emit(
            TimerEvent::Tick {
                remaining_seconds: self.remaining_seconds,
            },
            &mut events,
        );

        if self.remaining_seconds > 0 {
            if let Halfway::Armed { threshold } = self.halfway {
                if self.remaining_seconds <= threshold {
                    self.halfway = Halfway::Fired;
                    self.emit(TimerEvent::HalfwayPoint { mode: self.mode }, &mut events);
                }
            }
            return events;
        }

        let sessions_completed = if self.mode == Mode::Work {
            self.sessions_completed + 1
        } else {
            self.sessions_completed
        };
        self.emit(
            TimerEvent::SessionComplete {
                mode: self.mode,
                sessions_completed,
            },
            &mut events,
        );
        self.complete_session_into(&mut events);

        events
    }

    /// Finish the current session and move to the next mode.
    ///
    /// Work sessions bump the count and lead to a long break on every 4th
    /// completion, a short break otherwise; breaks lead back to work. The
    /// timer is always left paused.
    pub fn complete_session(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.complete_session_into(&mut events);
        events
    }

    /// Switch to `mode` with its full duration, paused.
    ///
    /// Never changes the session count.
    pub fn switch_mode(&mut self, mode: Mode) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.switch_mode_into(mode, &mut events);
        events
    }

    /// Replace all durations.
    ///
    /// Rejected without any change if a duration is zero. While paused the
    /// remaining time jumps to the new full duration; while running the
    /// session in progress keeps its remaining time.
    pub fn apply_settings(&mut self, config: TimerConfig) -> Result<Vec<TimerEvent>, TimerError> {
        if let Err(e) = config.validate() {
            tracing::warn!("Rejected settings {:?}: {}", config, e);
            return Err(e);
        }

        let mut events = Vec::new();
        self.config = config;
        if !self.is_running() {
            self.rewind();
        }

        tracing::info!(
            "Settings applied: work={}m short={}m long={}m",
            config.work,
            config.short_break,
            config.long_break
        );
        self.emit(TimerEvent::SettingsChanged { config }, &mut events);
        Ok(events)
    }

    /// Completed sessions still needed before the next long break.
    pub fn sessions_until_long_break(&self) -> u64 {
        self.snapshot().sessions_until_long_break()
    }

    fn start_into(&mut self, events: &mut Vec<TimerEvent>) {
        if self.is_running() {
            return;
        }

        self.tick_guard = Some(self.scheduler.acquire());
        let full = self.full_duration();
        if self.remaining_seconds == full {
            self.halfway = Halfway::Armed { threshold: full / 2 };
        }

        tracing::debug!("Timer started: {} with {}s left", self.mode, self.remaining_seconds);
        self.emit(
            TimerEvent::Started {
                mode: self.mode,
                remaining_seconds: self.remaining_seconds,
            },
            events,
        );
    }

    fn pause_into(&mut self, events: &mut Vec<TimerEvent>) {
        // Dropping the guard cancels the registration before we return
        let Some(guard) = self.tick_guard.take() else {
            return;
        };
        drop(guard);

        tracing::debug!("Timer paused: {} with {}s left", self.mode, self.remaining_seconds);
        self.emit(
            TimerEvent::Paused {
                mode: self.mode,
                remaining_seconds: self.remaining_seconds,
            },
            events,
        );
    }

    fn complete_session_into(&mut self, events: &mut Vec<TimerEvent>) {
        self.pause_into(events);

        let next = if self.mode == Mode::Work {
            self.sessions_completed += 1;
            self.metrics.record_session_completed();
            Mode::break_after(self.sessions_completed)
        } else {
            Mode::Work
        };

        tracing::info!(
            "{} session complete ({} work sessions total), next: {}",
            self.mode.label(),
            self.sessions_completed,
            next.label()
        );
        self.switch_mode_into(next, events);
    }

    fn switch_mode_into(&mut self, mode: Mode, events: &mut Vec<TimerEvent>) {
        self.pause_into(events);
        self.mode = mode;
        self.rewind();
        self.emit(TimerEvent::ModeChanged { mode }, events);
    }

    fn rewind(&mut self) {
        self.remaining_seconds = self.full_duration();
        self.halfway = Halfway::Idle;
    }

    fn emit(&self, event: TimerEvent, events: &mut Vec<TimerEvent>) {
        // Sending only fails when nobody is subscribed
        match self.event_tx.send(event.clone()) {
            Ok(_) => self.metrics.record_event_broadcast(),
            Err(_) => self.metrics.record_event_unobserved(),
        }
        events.push(event);
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("config", &self.config)
            .field("mode", &self.mode)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("running", &self.is_running())
            .field("sessions_completed", &self.sessions_completed)
            .field("halfway", &self.halfway)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (TimerEngine, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        (TimerEngine::with_defaults(scheduler.clone()), scheduler)
    }

    fn tick_n(engine: &mut TimerEngine, n: u64) -> Vec<TimerEvent> {
        (0..n).flat_map(|_| engine.tick()).collect()
    }

    fn completions(events: &[TimerEvent]) -> Vec<&TimerEvent> {
        events
            .iter()
            .filter(|e| matches!(e, TimerEvent::SessionComplete { .. }))
            .collect()
    }

    #[test]
    fn test_new_engine_defaults() {
        let (engine, scheduler) = engine();
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.remaining_seconds(), 1500);
        assert!(!engine.is_running());
        assert_eq!(engine.sessions_completed(), 0);
        assert_eq!(scheduler.active_registrations(), 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = TimerEngine::new(TimerConfig::new(25, 0, 15), 0, ManualScheduler::new());
        assert!(matches!(
            result,
            Err(TimerError::InvalidConfig { field: "shortBreak", .. })
        ));
    }

    #[test]
    fn test_new_keeps_persisted_count() {
        let engine = TimerEngine::new(TimerConfig::new(50, 10, 30), 7, ManualScheduler::new()).unwrap();
        assert_eq!(engine.sessions_completed(), 7);
        assert_eq!(engine.remaining_seconds(), 3000);
        assert_eq!(engine.sessions_until_long_break(), 1);
    }

    #[test]
    fn test_start_acquires_one_registration() {
        let (mut engine, scheduler) = engine();

        let events = engine.start();
        assert_eq!(
            events,
            vec![TimerEvent::Started {
                mode: Mode::Work,
                remaining_seconds: 1500
            }]
        );
        assert!(engine.is_running());
        assert_eq!(scheduler.active_registrations(), 1);
    }

    #[test]
    fn test_start_is_idempotent() {
        let (mut engine, scheduler) = engine();
        engine.start();
        let before = engine.snapshot();

        let events = engine.start();

        assert!(events.is_empty());
        assert_eq!(engine.snapshot(), before);
        assert_eq!(scheduler.active_registrations(), 1);
        assert_eq!(scheduler.total_acquisitions(), 1);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let (mut engine, scheduler) = engine();
        engine.start();
        engine.tick();

        let first = engine.pause();
        let after_first = engine.snapshot();
        let second = engine.pause();

        assert!(matches!(first.as_slice(), [TimerEvent::Paused { .. }]));
        assert!(second.is_empty());
        assert_eq!(engine.snapshot(), after_first);
        assert_eq!(scheduler.active_registrations(), 0);
    }

    #[test]
    fn test_toggle() {
        let (mut engine, _scheduler) = engine();
        engine.toggle();
        assert!(engine.is_running());
        engine.toggle();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_ticks_decrement_without_completion() {
        let (mut engine, _scheduler) = engine();
        engine.start();

        let events = tick_n(&mut engine, 100);

        assert_eq!(engine.remaining_seconds(), 1400);
        assert!(completions(&events).is_empty());
        assert_eq!(engine.metrics().ticks_processed.load(std::sync::atomic::Ordering::Relaxed), 100);
    }

    #[test]
    fn test_tick_ignored_while_paused() {
        let (mut engine, _scheduler) = engine();
        engine.start();
        engine.tick();
        engine.pause();

        let events = engine.tick();

        assert!(events.is_empty());
        assert_eq!(engine.remaining_seconds(), 1499);
    }

    #[test]
    fn test_reset_rewinds_current_mode() {
        let (mut engine, scheduler) = engine();
        engine.switch_mode(Mode::ShortBreak);
        engine.start();
        tick_n(&mut engine, 42);

        let events = engine.reset();

        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.remaining_seconds(), 300);
        assert!(!engine.is_running());
        assert_eq!(scheduler.active_registrations(), 0);
        assert_eq!(
            events.last(),
            Some(&TimerEvent::Reset {
                mode: Mode::ShortBreak,
                remaining_seconds: 300
            })
        );
    }

    #[test]
    fn test_switch_mode_resets_and_pauses() {
        let (mut engine, scheduler) = engine();
        engine.start();
        tick_n(&mut engine, 10);

        let events = engine.switch_mode(Mode::LongBreak);

        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.remaining_seconds(), 900);
        assert!(!engine.is_running());
        assert_eq!(engine.sessions_completed(), 0);
        assert_eq!(scheduler.active_registrations(), 0);
        assert_eq!(events.last(), Some(&TimerEvent::ModeChanged { mode: Mode::LongBreak }));
    }

    #[test]
    fn test_scenario_full_work_session() {
        let (mut engine, scheduler) = engine();
        engine.start();

        let events = tick_n(&mut engine, 1500);

        assert_eq!(
            completions(&events),
            vec![&TimerEvent::SessionComplete {
                mode: Mode::Work,
                sessions_completed: 1
            }]
        );
        assert_eq!(engine.sessions_completed(), 1);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.remaining_seconds(), 300);
        assert!(!engine.is_running());
        assert_eq!(scheduler.active_registrations(), 0);
    }

    #[test]
    fn test_completion_event_order() {
        let mut engine =
            TimerEngine::new(TimerConfig::new(1, 1, 1), 0, ManualScheduler::new()).unwrap();
        engine.start();
        tick_n(&mut engine, 59);

        let events = engine.tick();

        assert_eq!(
            events,
            vec![
                TimerEvent::Tick { remaining_seconds: 0 },
                TimerEvent::SessionComplete {
                    mode: Mode::Work,
                    sessions_completed: 1
                },
                TimerEvent::Paused {
                    mode: Mode::Work,
                    remaining_seconds: 0
                },
                TimerEvent::ModeChanged { mode: Mode::ShortBreak },
            ]
        );
    }

    #[test]
    fn test_break_completion_returns_to_work() {
        let (mut engine, _scheduler) = engine();
        engine.switch_mode(Mode::ShortBreak);
        engine.start();

        let events = tick_n(&mut engine, 300);

        assert_eq!(
            completions(&events),
            vec![&TimerEvent::SessionComplete {
                mode: Mode::ShortBreak,
                sessions_completed: 0
            }]
        );
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.sessions_completed(), 0);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_fourth_work_session_leads_to_long_break() {
        let (mut engine, _scheduler) = engine();

        for round in 1..=4u64 {
            assert_eq!(engine.mode(), Mode::Work);
            engine.start();
            tick_n(&mut engine, 1500);
            assert_eq!(engine.sessions_completed(), round);

            if round < 4 {
                assert_eq!(engine.mode(), Mode::ShortBreak);
                engine.start();
                tick_n(&mut engine, 300);
            }
        }

        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.remaining_seconds(), 900);
    }

    #[test]
    fn test_complete_session_directly() {
        let (mut engine, _scheduler) = engine();
        engine.start();

        let events = engine.complete_session();

        assert_eq!(engine.sessions_completed(), 1);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert!(completions(&events).is_empty());
    }

    #[test]
    fn test_apply_settings_while_paused() {
        let (mut engine, _scheduler) = engine();

        let events = engine.apply_settings(TimerConfig::new(10, 2, 20)).unwrap();

        assert_eq!(engine.config(), TimerConfig::new(10, 2, 20));
        assert_eq!(engine.remaining_seconds(), 600);
        assert_eq!(
            events,
            vec![TimerEvent::SettingsChanged {
                config: TimerConfig::new(10, 2, 20)
            }]
        );
    }

    #[test]
    fn test_apply_settings_while_running_keeps_session() {
        let (mut engine, _scheduler) = engine();
        engine.start();
        tick_n(&mut engine, 5);

        engine.apply_settings(TimerConfig::new(10, 2, 20)).unwrap();

        assert_eq!(engine.remaining_seconds(), 1495);
        assert!(engine.is_running());

        engine.switch_mode(Mode::Work);
        assert_eq!(engine.remaining_seconds(), 600);
    }

    #[test]
    fn test_apply_settings_rejects_zero() {
        let (mut engine, _scheduler) = engine();
        engine.apply_settings(TimerConfig::new(30, 5, 15)).unwrap();

        let result = engine.apply_settings(TimerConfig::new(0, 5, 15));

        assert!(matches!(result, Err(TimerError::InvalidConfig { field: "work", .. })));
        assert_eq!(engine.config(), TimerConfig::new(30, 5, 15));
        assert_eq!(engine.remaining_seconds(), 1800);
    }

    #[test]
    fn test_progress_fraction() {
        let (mut engine, _scheduler) = engine();
        assert_eq!(engine.progress_fraction(), 0.0);

        engine.start();
        tick_n(&mut engine, 750);
        assert!((engine.progress_fraction() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_fraction_clamped_after_shrinking_running_session() {
        let (mut engine, _scheduler) = engine();
        engine.start();
        engine.apply_settings(TimerConfig::new(1, 5, 15)).unwrap();

        assert_eq!(engine.progress_fraction(), 0.0);
    }

    #[test]
    fn test_halfway_fires_once() {
        let (mut engine, _scheduler) = engine();
        engine.start();

        let before = tick_n(&mut engine, 749);
        assert!(!before.iter().any(|e| matches!(e, TimerEvent::HalfwayPoint { .. })));

        let at_half = engine.tick();
        assert_eq!(engine.remaining_seconds(), 750);
        assert!(at_half.contains(&TimerEvent::HalfwayPoint { mode: Mode::Work }));

        let after = tick_n(&mut engine, 100);
        assert!(!after.iter().any(|e| matches!(e, TimerEvent::HalfwayPoint { .. })));
    }

    #[test]
    fn test_halfway_survives_pause_resume() {
        let (mut engine, _scheduler) = engine();
        engine.start();
        tick_n(&mut engine, 500);
        engine.pause();
        engine.start();

        let events = tick_n(&mut engine, 250);

        let halfway: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, TimerEvent::HalfwayPoint { .. }))
            .collect();
        assert_eq!(halfway.len(), 1);
        assert_eq!(engine.remaining_seconds(), 750);
    }

    #[test]
    fn test_halfway_not_repeated_after_resume_past_threshold() {
        let (mut engine, _scheduler) = engine();
        engine.start();
        tick_n(&mut engine, 800);
        engine.pause();
        engine.start();

        let events = tick_n(&mut engine, 100);

        assert!(!events.iter().any(|e| matches!(e, TimerEvent::HalfwayPoint { .. })));
    }

    #[test]
    fn test_halfway_rearms_after_reset() {
        let (mut engine, _scheduler) = engine();
        engine.start();
        tick_n(&mut engine, 800);
        engine.reset();
        engine.start();

        let events = tick_n(&mut engine, 750);

        assert!(events.contains(&TimerEvent::HalfwayPoint { mode: Mode::Work }));
    }

    #[test]
    fn test_subscribe_receives_events() {
        let (mut engine, _scheduler) = engine();
        let mut rx = engine.subscribe();

        engine.start();
        engine.tick();

        assert!(matches!(rx.try_recv(), Ok(TimerEvent::Started { .. })));
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::Tick { remaining_seconds: 1499 });
    }

    #[test]
    fn test_multiple_subscribers() {
        let (mut engine, _scheduler) = engine();
        let mut rx1 = engine.subscribe();
        let mut rx2 = engine.subscribe();

        engine.switch_mode(Mode::LongBreak);

        assert_eq!(rx1.try_recv().unwrap(), TimerEvent::ModeChanged { mode: Mode::LongBreak });
        assert_eq!(rx2.try_recv().unwrap(), TimerEvent::ModeChanged { mode: Mode::LongBreak });
    }

    #[test]
    fn test_drop_releases_registration() {
        let (mut engine, scheduler) = engine();
        engine.start();
        drop(engine);
        assert_eq!(scheduler.active_registrations(), 0);
    }
}
