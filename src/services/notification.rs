// Session-complete notifications
//
// Plays a sound and, when the user is away from the app, shows a
// notification for every completed session.

use super::display::APP_TITLE;
use crate::models::Mode;
use crate::state::TimerEvent;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Notification text for a completed session of `mode`.
pub fn completion_message(mode: Mode) -> &'static str {
    match mode {
        Mode::Work => "Work session completed! Time for a break.",
        Mode::ShortBreak => "Break over! Ready to focus?",
        Mode::LongBreak => "Long break finished! Let's get back to work.",
    }
}

/// Output channel for sounds and notifications.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send {
    /// Play the one-shot completion sound.
    fn play_sound(&mut self);

    /// Show an OS-level notification.
    fn show(&mut self, title: &str, body: &str);
}

/// Shared "app has focus" flag, set by the host.
#[derive(Debug, Clone)]
pub struct FocusState(Arc<AtomicBool>);

impl Default for FocusState {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_foreground(&self, foreground: bool) {
        self.0.store(foreground, Ordering::Relaxed);
    }

    pub fn is_foreground(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reacts to `SessionComplete` events.
pub struct Notifier {
    sink: Box<dyn NotificationSink>,
    sound_enabled: bool,
    notifications_enabled: bool,
    focus: FocusState,
}

impl Notifier {
    pub fn new<S>(sink: S, sound_enabled: bool, notifications_enabled: bool, focus: FocusState) -> Self
    where
        S: NotificationSink + 'static,
    {
        Self {
            sink: Box::new(sink),
            sound_enabled,
            notifications_enabled,
            focus,
        }
    }

    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    /// Handle one event. Returns true if anything was played or shown.
    pub fn handle(&mut self, event: &TimerEvent) -> bool {
        let TimerEvent::SessionComplete { mode, .. } = event else {
            return false;
        };

        let mut notified = false;
        if self.sound_enabled {
            self.sink.play_sound();
            notified = true;
        }
        if self.notifications_enabled && !self.focus.is_foreground() {
            self.sink.show(APP_TITLE, completion_message(*mode));
            notified = true;
        }

        tracing::debug!("Session complete notification for {} (delivered: {})", mode, notified);
        notified
    }
}
