use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of completed work sessions between long breaks.
pub const SESSIONS_PER_LONG_BREAK: u64 = 4;

/// The three phases of the focus cycle.
///
/// Serialized with the camelCase names used in the persisted settings
/// document (`work`, `shortBreak`, `longBreak`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl Mode {
    /// All modes in display order.
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    /// Human-readable label shown in titles and headers.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Focus Time",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Key used in the settings document.
    pub fn key(self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::ShortBreak => "shortBreak",
            Mode::LongBreak => "longBreak",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Mode::Work)
    }

    /// Break that follows the given number of completed work sessions.
    pub fn break_after(sessions_completed: u64) -> Mode {
        if sessions_completed % SESSIONS_PER_LONG_BREAK == 0 {
            Mode::LongBreak
        } else {
            Mode::ShortBreak
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a mode name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}' (expected work, short or long)")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" | "focus" | "1" => Ok(Mode::Work),
            "shortbreak" | "short-break" | "short_break" | "short" | "2" => Ok(Mode::ShortBreak),
            "longbreak" | "long-break" | "long_break" | "long" | "3" => Ok(Mode::LongBreak),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Point-in-time copy of the timer state.
///
/// Collaborators read this instead of holding a reference to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: Mode,
    pub remaining_seconds: u64,
    pub running: bool,
    pub sessions_completed: u64,
}

impl TimerState {
    /// Completed sessions still needed before the next long break.
    ///
    /// Returns 4 right after a long-break-triggering completion.
    pub fn sessions_until_long_break(&self) -> u64 {
        SESSIONS_PER_LONG_BREAK - (self.sessions_completed % SESSIONS_PER_LONG_BREAK)
    }
}
