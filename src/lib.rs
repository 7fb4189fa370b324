// Focus Timer - Pomodoro timer with a canned-response focus coach
//
// This is the library crate containing the timer engine and its collaborators.
// The binary crate (main.rs) provides the terminal entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{CoachConfig, Mode, TimerConfig, TimerError, TimerState, UserConfig};
pub use state::{ManualScheduler, TickGuard, TickScheduler, TimerEngine, TimerEvent};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
