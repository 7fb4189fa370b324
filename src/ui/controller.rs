// Controller - wires the timer engine to the terminal
//
// The controller task owns the TimerEngine exclusively. It multiplexes tick
// requests, user commands and the periodic store flush with tokio::select!,
// while the coach and the notifier run as independent tasks fed by the
// engine's broadcast channel.

use super::bridge::{ConsoleLine, ConsoleSender, TickFilter, TickRequest, TokioScheduler};
use super::commands::{Command, HELP_TEXT};
use crate::metrics::Metrics;
use crate::models::{TimerConfig, TimerState, UserConfig};
use crate::services::{
    Coach, Display, FocusState, KeyValueStore, Notifier, format_clock, load_session_count,
    load_settings, save_session_count, save_settings,
};
use crate::state::{TimerEngine, TimerEvent};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// How long shutdown waits for the coach and notifier to drain their events.
const LISTENER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Timing knobs for the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Interval between engine ticks
    pub tick_period: Duration,

    /// Interval between session count flushes
    pub flush_interval: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            flush_interval: Duration::from_secs(30),
        }
    }
}

impl From<&UserConfig> for ControllerOptions {
    fn from(config: &UserConfig) -> Self {
        Self {
            flush_interval: Duration::from_secs(config.flush_interval_secs.max(1)),
            ..Self::default()
        }
    }
}

/// Main controller that drives the engine from user input and ticks.
pub struct Controller {
    engine: TimerEngine,

    /// Key-value store for settings and the session count
    store: Arc<dyn KeyValueStore>,

    tick_rx: mpsc::UnboundedReceiver<TickRequest>,
    tick_filter: TickFilter,

    display: Display,
    console: ConsoleSender,

    /// Free text for the coach task
    chat_tx: mpsc::UnboundedSender<String>,

    focus: FocusState,
    flush_interval: Duration,

    /// Session count last written to the store
    flushed_sessions: u64,

    metrics: Arc<Metrics>,
    listeners: Vec<JoinHandle<()>>,
}

impl Controller {
    /// Create a controller from the persisted state in `store`.
    ///
    /// Must be called inside a tokio runtime: the coach and notifier tasks
    /// are spawned here.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        mut coach: Coach,
        notifier: Notifier,
        options: ControllerOptions,
        console: ConsoleSender,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        let tokio_handle = tokio::runtime::Handle::try_current()
            .context("Controller must be created inside a tokio runtime")?;

        let config = load_settings(store.as_ref());
        let sessions = load_session_count(store.as_ref());

        let (scheduler, tick_rx) = TokioScheduler::new(tokio_handle.clone(), options.tick_period);
        let tick_filter = scheduler.filter();
        let engine = TimerEngine::new(config, sessions, scheduler)
            .context("Persisted settings were rejected")?
            .with_metrics(Arc::clone(&metrics));

        coach.set_durations(engine.config());
        let focus = notifier.focus().clone();
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();

        let listeners = vec![
            tokio_handle.spawn(run_coach(
                coach,
                engine.subscribe(),
                chat_rx,
                console.clone(),
                Arc::clone(&metrics),
            )),
            tokio_handle.spawn(run_notifier(notifier, engine.subscribe())),
        ];

        tracing::info!(
            "Controller initialized: {} work sessions completed, durations {}/{}/{} minutes",
            sessions,
            config.work,
            config.short_break,
            config.long_break
        );

        Ok(Self {
            engine,
            store,
            tick_rx,
            tick_filter,
            display: Display::new(),
            console,
            chat_tx,
            focus,
            flush_interval: options.flush_interval,
            flushed_sessions: sessions,
            metrics,
            listeners,
        })
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    /// Run until `Quit` arrives or the command channel closes.
    ///
    /// The timer is paused and the session count flushed before returning
    /// the final state.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> TimerState {
        tracing::info!("Starting timer loop");
        self.message("Type 'help' for commands, space or 't' to start.");
        self.render();

        let mut flush = time::interval_at(Instant::now() + self.flush_interval, self.flush_interval);

        loop {
            tokio::select! {
                Some(tick) = self.tick_rx.recv() => {
                    if self.tick_filter.is_current(&tick) {
                        let events = self.engine.tick();
                        self.after(&events);
                    } else {
                        tracing::trace!("Dropping stale tick {:?}", tick);
                    }
                }
                command = commands.recv() => match command {
                    Some(Command::Quit) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = flush.tick() => {
                    self.flush_session_count();
                    self.metrics.log_periodic();
                }
            }
        }

        tracing::info!("Stopping timer loop");
        let events = self.engine.pause();
        self.after(&events);
        self.flush_session_count();

        let state = self.engine.snapshot();
        self.shutdown().await;
        state
    }

    /// Apply one command to the engine.
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Toggle => {
                let events = self.engine.toggle();
                self.after(&events);
            }
            Command::Start => {
                let events = self.engine.start();
                self.after(&events);
            }
            Command::Pause => {
                let events = self.engine.pause();
                self.after(&events);
            }
            Command::Reset => {
                let events = self.engine.reset();
                self.after(&events);
            }
            Command::SwitchMode(mode) => {
                let events = self.engine.switch_mode(mode);
                self.after(&events);
            }
            Command::ApplySettings(config) => match self.engine.apply_settings(config) {
                Ok(events) => {
                    self.persist_settings(&config);
                    self.message(format!(
                        "Settings saved: {} / {} / {} minutes",
                        config.work, config.short_break, config.long_break
                    ));
                    self.after(&events);
                }
                Err(e) => self.message(e.to_string()),
            },
            Command::Status => self.message(self.status_text()),
            Command::Chat(text) => {
                self.message(format!("You: {text}"));
                if self.chat_tx.send(text).is_err() {
                    tracing::warn!("Coach task is gone, dropping message");
                }
            }
            Command::Away => {
                self.focus.set_foreground(false);
                self.message("Marked as away: notifications will be shown.");
            }
            Command::Back => {
                self.focus.set_foreground(true);
                self.message("Welcome back!");
            }
            Command::Help => self.message(HELP_TEXT),
            Command::Quit => {}
        }
    }

    fn after(&mut self, events: &[TimerEvent]) {
        if events.is_empty() {
            return;
        }
        for event in events {
            self.display.apply(event);
        }
        self.render();
    }

    fn render(&self) {
        let frame = self
            .display
            .render(&self.engine.snapshot(), self.engine.progress_fraction());
        let _ = self.console.send(ConsoleLine::Status(frame.to_string()));
    }

    fn message(&self, text: impl Into<String>) {
        let _ = self.console.send(ConsoleLine::Message(text.into()));
    }

    fn status_text(&self) -> String {
        let state = self.engine.snapshot();
        let config: TimerConfig = self.engine.config();
        format!(
            "{} | {} left | {} | {} work sessions completed, {} until long break | durations {}/{}/{} minutes",
            state.mode.label(),
            format_clock(state.remaining_seconds),
            if state.running { "running" } else { "paused" },
            state.sessions_completed,
            state.sessions_until_long_break(),
            config.work,
            config.short_break,
            config.long_break
        )
    }

    fn persist_settings(&self, config: &TimerConfig) {
        match save_settings(self.store.as_ref(), config) {
            Ok(()) => {
                self.metrics.record_store_write();
                tracing::debug!("Settings persisted");
            }
            Err(e) => {
                self.metrics.record_store_write_error();
                tracing::warn!("Failed to persist settings: {}", e);
            }
        }
    }

    fn flush_session_count(&mut self) {
        let sessions = self.engine.sessions_completed();
        if sessions == self.flushed_sessions {
            return;
        }

        match save_session_count(self.store.as_ref(), sessions) {
            Ok(()) => {
                self.flushed_sessions = sessions;
                self.metrics.record_store_write();
                tracing::debug!("Session count {} flushed", sessions);
            }
            Err(e) => {
                self.metrics.record_store_write_error();
                tracing::warn!("Failed to flush session count: {}", e);
            }
        }
    }

    /// Close the event and chat channels and wait for the listeners to drain.
    async fn shutdown(self) {
        let Controller {
            engine,
            chat_tx,
            listeners,
            ..
        } = self;
        drop(chat_tx);
        drop(engine);

        for listener in listeners {
            match time::timeout(LISTENER_SHUTDOWN_TIMEOUT, listener).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Listener task failed: {}", e),
                Err(_) => tracing::warn!("Listener task did not stop in time"),
            }
        }
        tracing::debug!("Controller shut down");
    }
}

/// Coach task: answers chat input and comments on timer events.
async fn run_coach(
    mut coach: Coach,
    mut events: broadcast::Receiver<TimerEvent>,
    mut chat_rx: mpsc::UnboundedReceiver<String>,
    console: ConsoleSender,
    metrics: Arc<Metrics>,
) {
    tracing::debug!("Coach task started");

    loop {
        let reply = tokio::select! {
            event = events.recv() => match event {
                Ok(event) => coach.on_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Coach lagged behind, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(text) = chat_rx.recv() => coach.reply(&text),
        };

        if let Some(reply) = reply {
            metrics.record_coach_reply();
            let _ = console.send(ConsoleLine::Message(format!("Coach: {reply}")));
        }
    }

    tracing::debug!("Coach task terminated");
}

/// Notifier task: sound and notification on every completed session.
async fn run_notifier(mut notifier: Notifier, mut events: broadcast::Receiver<TimerEvent>) {
    tracing::debug!("Notifier task started");

    loop {
        match events.recv().await {
            Ok(event) => {
                notifier.handle(&event);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Notifier lagged behind, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    tracing::debug!("Notifier task terminated");
}
