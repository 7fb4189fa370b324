// Terminal display
//
// Turns engine events and queries into the clock, window title, progress
// ring and session line the host renders.

use crate::models::{Mode, SESSIONS_PER_LONG_BREAK, TimerState};
use crate::state::TimerEvent;
use std::f64::consts::PI;
use std::fmt;

pub const APP_TITLE: &str = "Focus Timer";

/// Radius of the progress ring, in display units.
pub const PROGRESS_RING_RADIUS: f64 = 134.0;

/// Format seconds as `MM:SS`, zero padded.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Title shown while the timer counts down, e.g. `24:59 - Focus Timer`.
pub fn running_title(seconds: u64) -> String {
    format!("{}:{:02} - {}", seconds / 60, seconds % 60, APP_TITLE)
}

pub fn ring_circumference() -> f64 {
    2.0 * PI * PROGRESS_RING_RADIUS
}

/// Dash offset of the progress ring for a completion fraction in `[0, 1]`.
pub fn ring_offset(fraction: f64) -> f64 {
    let circumference = ring_circumference();
    circumference - fraction.clamp(0.0, 1.0) * circumference
}

/// Session line: `"Long break time!"` on a positive multiple of four,
/// otherwise the number of work sessions left before the long break.
pub fn session_info(sessions_completed: u64) -> String {
    if sessions_completed > 0 && sessions_completed % SESSIONS_PER_LONG_BREAK == 0 {
        return "Long break time!".to_string();
    }
    match SESSIONS_PER_LONG_BREAK - sessions_completed % SESSIONS_PER_LONG_BREAK {
        1 => "1 session".to_string(),
        n => format!("{n} sessions"),
    }
}

/// Everything the terminal shows for one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub clock: String,
    pub title: String,
    pub mode: Mode,
    pub running: bool,
    pub ring_offset: f64,
    pub progress: f64,
    pub sessions_completed: u64,
    pub session_info: String,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {:>3.0}% | completed {} | {} | {}",
            self.mode.label(),
            self.clock,
            if self.running { "▶" } else { "⏸" },
            self.progress * 100.0,
            self.sessions_completed,
            self.session_info,
            self.title
        )
    }
}

/// Title state driven by engine events.
///
/// The clock and ring are recomputed from the engine on every render; only
/// the title depends on which event came last.
#[derive(Debug, Clone)]
pub struct Display {
    title: String,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            title: APP_TITLE.to_string(),
        }
    }
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Update the title for one event.
    pub fn apply(&mut self, event: &TimerEvent) {
        match event {
            TimerEvent::Tick { remaining_seconds } => {
                self.title = running_title(*remaining_seconds);
            }
            TimerEvent::Paused { .. } => {
                self.title = format!("{APP_TITLE} - Paused");
            }
            TimerEvent::ModeChanged { mode } => {
                self.title = format!("{APP_TITLE} - {}", mode.label());
            }
            TimerEvent::Reset { .. } => {
                self.title = APP_TITLE.to_string();
            }
            _ => {}
        }
    }

    /// Build a frame from an engine snapshot and its progress fraction.
    pub fn render(&self, state: &TimerState, progress: f64) -> Frame {
        Frame {
            clock: format_clock(state.remaining_seconds),
            title: self.title.clone(),
            mode: state.mode,
            running: state.running,
            ring_offset: ring_offset(progress),
            progress: progress.clamp(0.0, 1.0),
            sessions_completed: state.sessions_completed,
            session_info: session_info(state.sessions_completed),
        }
    }
}
