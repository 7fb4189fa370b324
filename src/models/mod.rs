//! Data models for the focus timer.
//!
//! - [`Mode`]: the three phases of the focus cycle and the long-break cadence
//! - [`TimerState`]: snapshot of the engine state handed to collaborators
//! - [`TimerConfig`]: per-mode durations, persisted in the key-value store
//! - [`UserConfig`]: host preferences loaded from `FocusTimer Config.yaml`
//! - [`CoachConfig`]: ordered keyword rules for the focus coach
//!
//! # Architecture Note
//!
//! Config structs derive `Serialize`/`Deserialize`. [`TimerState`] is only ever
//! produced by [`TimerEngine::snapshot`](crate::state::TimerEngine::snapshot);
//! mutation goes through the engine operations.

pub mod config;
pub mod timer_state;

pub use config::{CoachConfig, CoachRule, TimerConfig, TimerError, UserConfig};
pub use timer_state::{Mode, ParseModeError, SESSIONS_PER_LONG_BREAK, TimerState};
