//! Services module - collaborators that react to the timer engine.
//!
//! None of these hold a reference to the engine. They consume
//! [`TimerEvent`](crate::state::TimerEvent)s and snapshots, which keeps them
//! testable without a running timer.
//!
//! # Components
//!
//! - [`Coach`]: canned-response assistant. Answers free text from an ordered
//!   keyword table and comments on completed sessions and halfway points.
//! - [`Display`]: clock, window title, progress ring and session line.
//! - [`Notifier`]: completion sound and away-from-app notification, through a
//!   [`NotificationSink`].
//! - [`storage`]: the [`KeyValueStore`] boundary plus the settings and
//!   session count helpers used at startup and on flush.
//!
//! # Usage Example
//!
//! ```ignore
//! use focus_timer::services::{Coach, load_settings, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let mut coach = Coach::new(CoachConfig::default());
//! coach.set_durations(load_settings(&store));
//! let reply = coach.reply("I'm getting distracted");
//! ```

pub mod coach;
pub mod display;
pub mod notification;
pub mod storage;

pub use coach::{Coach, RandomPicker, ResponsePicker};
pub use display::{Display, Frame, format_clock, ring_offset, running_title, session_info};
pub use notification::{FocusState, NotificationSink, Notifier, completion_message};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, StorageError, load_session_count, load_settings,
    save_session_count, save_settings,
};
