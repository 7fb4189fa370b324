// Tokio bridge - drives the timer engine from the tokio runtime
//
// This module contains:
// - TokioScheduler: a TickScheduler whose registrations are interval tasks
//   that post tick requests to the controller over an mpsc channel
// - Console output: a single task that owns stdout so the status line and
//   messages from every collaborator never interleave mid-line
// - ConsoleSink: the notification sink that rings the bell on that console

use crate::services::NotificationSink;
use crate::state::{TickGuard, TickScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// One tick posted by an interval task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRequest {
    generation: u64,
}

/// Tells the controller whether a tick request came from the live registration.
///
/// A request can still sit in the channel after its registration was
/// cancelled; the filter rejects it so a later registration never receives
/// an extra tick.
#[derive(Debug, Clone)]
pub struct TickFilter {
    current: Arc<AtomicU64>,
}

impl TickFilter {
    pub fn is_current(&self, tick: &TickRequest) -> bool {
        tick.generation != 0 && self.current.load(Ordering::SeqCst) == tick.generation
    }
}

/// [`TickScheduler`] backed by tokio interval tasks.
///
/// Each registration spawns one task that ticks every `period`, with the
/// first tick one full period after `acquire`. Dropping the guard aborts
/// the task.
pub struct TokioScheduler {
    /// Handle to the tokio runtime for spawning interval tasks
    tokio_handle: tokio::runtime::Handle,

    period: Duration,
    tick_tx: mpsc::UnboundedSender<TickRequest>,

    next_generation: u64,

    /// Generation of the live registration, 0 when none
    current: Arc<AtomicU64>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its tick requests arrive on.
    ///
    /// `period` must be non-zero.
    pub fn new(
        tokio_handle: tokio::runtime::Handle,
        period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<TickRequest>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tokio_handle,
            period,
            tick_tx,
            next_generation: 0,
            current: Arc::new(AtomicU64::new(0)),
        };
        (scheduler, tick_rx)
    }

    pub fn filter(&self) -> TickFilter {
        TickFilter {
            current: Arc::clone(&self.current),
        }
    }
}

impl TickScheduler for TokioScheduler {
    fn acquire(&mut self) -> TickGuard {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.current.store(generation, Ordering::SeqCst);

        let tick_tx = self.tick_tx.clone();
        let period = self.period;
        let task = self.tokio_handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tick_tx.send(TickRequest { generation }).is_err() {
                    break;
                }
            }
        });
        tracing::trace!("Tick registration {} acquired", generation);

        let current = Arc::clone(&self.current);
        TickGuard::new(move || {
            task.abort();
            let _ = current.compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst);
            tracing::trace!("Tick registration {} cancelled", generation);
        })
    }
}

/// Output for the console task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// Replaces the current status line in place
    Status(String),
    /// Printed on its own line above the status line
    Message(String),
    /// Terminal bell
    Bell,
}

pub type ConsoleSender = mpsc::UnboundedSender<ConsoleLine>;

/// Notification sink that writes to the console task.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    console: ConsoleSender,
}

impl ConsoleSink {
    pub fn new(console: ConsoleSender) -> Self {
        Self { console }
    }
}

impl NotificationSink for ConsoleSink {
    fn play_sound(&mut self) {
        let _ = self.console.send(ConsoleLine::Bell);
    }

    fn show(&mut self, title: &str, body: &str) {
        let _ = self.console.send(ConsoleLine::Message(format!("🔔 {title}: {body}")));
    }
}

/// Write console lines until every sender is dropped.
pub async fn run_console<W>(mut rx: mpsc::UnboundedReceiver<ConsoleLine>, mut out: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        let text = match line {
            ConsoleLine::Status(status) => format!("\r\x1b[2K{status}"),
            ConsoleLine::Message(message) => format!("\r\x1b[2K{message}\n"),
            ConsoleLine::Bell => "\x07".to_string(),
        };
        if let Err(e) = write_and_flush(&mut out, &text).await {
            tracing::warn!("Console output failed: {}", e);
            break;
        }
    }
    // Leave the cursor on a fresh line
    let _ = write_and_flush(&mut out, "\n").await;
    tracing::debug!("Console task terminated");
}

async fn write_and_flush<W>(out: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}
