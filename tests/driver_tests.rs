//! End-to-end tests of the controller loop on the tokio runtime
//!
//! Time is paused, so the interval tasks behind TokioScheduler advance
//! instantly while the test sleeps.

use focus_timer::models::CoachConfig;
use focus_timer::services::storage::{SESSION_COUNT_KEY, SETTINGS_KEY};
use focus_timer::services::{Coach, FocusState, KeyValueStore, MemoryStore, Notifier};
use focus_timer::ui::{Command, ConsoleLine, ConsoleSink, Controller, ControllerOptions};
use focus_timer::{Metrics, Mode, TimerState};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct Harness {
    store: Arc<MemoryStore>,
    metrics: Arc<Metrics>,
    commands: mpsc::Sender<Command>,
    console: mpsc::UnboundedReceiver<ConsoleLine>,
    focus: FocusState,
    task: JoinHandle<TimerState>,
}

impl Harness {
    fn start(store: Arc<MemoryStore>) -> Self {
        let metrics = Arc::new(Metrics::new());
        let (console_tx, console) = mpsc::unbounded_channel();
        let focus = FocusState::new();

        let notifier = Notifier::new(ConsoleSink::new(console_tx.clone()), true, true, focus.clone());
        let coach = Coach::with_picker(CoachConfig::default(), |_: usize| 0);
        let options = ControllerOptions {
            tick_period: Duration::from_secs(1),
            flush_interval: Duration::from_secs(30),
        };

        let controller = Controller::new(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            coach,
            notifier,
            options,
            console_tx,
            Arc::clone(&metrics),
        )
        .unwrap();

        let (commands, command_rx) = mpsc::channel(8);
        let task = tokio::spawn(controller.run(command_rx));

        Self {
            store,
            metrics,
            commands,
            console,
            focus,
            task,
        }
    }

    async fn send(&self, command: Command) {
        self.commands.send(command).await.unwrap();
    }

    async fn quit(self) -> (TimerState, Vec<ConsoleLine>, Arc<MemoryStore>, Arc<Metrics>) {
        self.send(Command::Quit).await;
        let state = self.task.await.unwrap();

        let mut console = self.console;
        let mut lines = Vec::new();
        while let Ok(line) = console.try_recv() {
            lines.push(line);
        }
        (state, lines, self.store, self.metrics)
    }
}

fn messages(lines: &[ConsoleLine]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|line| match line {
            ConsoleLine::Message(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn one_minute_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .set(SETTINGS_KEY, r#"{"work":1,"shortBreak":1,"longBreak":2}"#)
        .unwrap();
    store
}

#[tokio::test(start_paused = true)]
async fn test_work_session_completes_under_paused_time() {
    let harness = Harness::start(one_minute_store());
    harness.send(Command::Start).await;

    tokio::time::sleep(Duration::from_secs(61)).await;
    let (state, lines, store, metrics) = harness.quit().await;

    assert_eq!(state.mode, Mode::ShortBreak);
    assert_eq!(state.remaining_seconds, 60);
    assert!(!state.running);
    assert_eq!(state.sessions_completed, 1);

    // Flushed on shutdown
    assert_eq!(store.get(SESSION_COUNT_KEY).unwrap(), Some("1".to_string()));
    assert_eq!(metrics.ticks_processed.load(Ordering::Relaxed), 60);

    let messages = messages(&lines);
    assert!(messages.iter().any(|m| m.starts_with("Coach: You're halfway through!")));
    assert!(messages.iter().any(|m| {
        *m == "Coach: Great job finishing that focus session! 🌟 Take a 1-minute break and come back refreshed."
    }));
    assert!(lines.contains(&ConsoleLine::Bell));
}

#[tokio::test(start_paused = true)]
async fn test_pause_stops_the_clock() {
    let harness = Harness::start(Arc::new(MemoryStore::new()));
    harness.send(Command::Toggle).await;
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    harness.send(Command::Toggle).await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    let (state, _, _, _) = harness.quit().await;
    assert_eq!(state.mode, Mode::Work);
    assert_eq!(state.remaining_seconds, 1500 - 10);
    assert!(!state.running);
}

#[tokio::test(start_paused = true)]
async fn test_settings_persisted_and_invalid_rejected() {
    let harness = Harness::start(Arc::new(MemoryStore::new()));
    harness
        .send(Command::ApplySettings(focus_timer::TimerConfig::new(50, 10, 30)))
        .await;
    harness.send(Command::Chat("how does it work?".to_string())).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let (state, lines, store, _) = harness.quit().await;
    assert_eq!(state.remaining_seconds, 50 * 60);
    assert_eq!(
        store.get(SETTINGS_KEY).unwrap(),
        Some(r#"{"work":50,"shortBreak":10,"longBreak":30}"#.to_string())
    );

    let messages = messages(&lines);
    assert!(messages.contains(&"You: how does it work?"));
    assert!(messages.iter().any(|m| m.starts_with("Coach: The Pomodoro Technique is simple")));
}

#[tokio::test(start_paused = true)]
async fn test_away_user_gets_notification() {
    let harness = Harness::start(one_minute_store());
    harness.send(Command::Away).await;
    harness.send(Command::Start).await;
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert!(!harness.focus.is_foreground());

    let (_, lines, _, _) = harness.quit().await;
    assert!(messages(&lines).contains(&"🔔 Focus Timer: Work session completed! Time for a break."));
}

#[tokio::test(start_paused = true)]
async fn test_session_count_flushed_periodically() {
    let harness = Harness::start(one_minute_store());
    harness.send(Command::Start).await;

    // One minute of work, then wait for the 30s flush tick to pass
    tokio::time::sleep(Duration::from_secs(95)).await;
    assert_eq!(
        harness.store.get(SESSION_COUNT_KEY).unwrap(),
        Some("1".to_string())
    );

    harness.quit().await;
}

#[tokio::test(start_paused = true)]
async fn test_restart_resumes_persisted_count() {
    let store = one_minute_store();
    store.set(SESSION_COUNT_KEY, "3").unwrap();

    let harness = Harness::start(Arc::clone(&store));
    harness.send(Command::Start).await;
    tokio::time::sleep(Duration::from_secs(61)).await;

    let (state, lines, _, _) = harness.quit().await;
    assert_eq!(state.sessions_completed, 4);
    assert_eq!(state.mode, Mode::LongBreak);
    assert!(messages(&lines).iter().any(|m| {
        m.starts_with("Coach: Amazing work! 🎉 You've completed 4 sessions.")
    }));
}
