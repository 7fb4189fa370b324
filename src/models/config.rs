use crate::models::Mode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the timer engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// A duration was missing, non-integer, or not strictly positive.
    ///
    /// The engine keeps its previous configuration when this is returned.
    #[error("Invalid {field} duration: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl TimerError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TimerError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Durations of each mode, in whole minutes.
///
/// Persisted under the `settings` key as `{"work":25,"shortBreak":5,"longBreak":15}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    pub work: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work: 25,
            short_break: 5,
            long_break: 15,
        }
    }
}

impl TimerConfig {
    pub fn new(work: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            work,
            short_break,
            long_break,
        }
    }

    /// Duration of a mode in minutes.
    pub fn minutes(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }

    /// Full duration of a mode in seconds.
    pub fn duration_secs(&self, mode: Mode) -> u64 {
        u64::from(self.minutes(mode)) * 60
    }

    /// Check that every duration is at least one minute.
    pub fn validate(&self) -> Result<(), TimerError> {
        for mode in Mode::ALL {
            if self.minutes(mode) == 0 {
                return Err(TimerError::invalid(
                    mode.key(),
                    "duration must be a positive number of minutes",
                ));
            }
        }
        Ok(())
    }

    /// Build a config from raw user input, rejecting anything that is not a
    /// positive whole number of minutes.
    pub fn parse(work: &str, short_break: &str, long_break: &str) -> Result<Self, TimerError> {
        let config = Self {
            work: parse_minutes(Mode::Work.key(), work)?,
            short_break: parse_minutes(Mode::ShortBreak.key(), short_break)?,
            long_break: parse_minutes(Mode::LongBreak.key(), long_break)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Strictly interpret a JSON settings object.
    ///
    /// Every field must be present and hold a positive integer. Used for
    /// settings coming from a user, never for persisted data.
    pub fn from_json_strict(value: &serde_json::Value) -> Result<Self, TimerError> {
        let field = |mode: Mode| -> Result<u32, TimerError> {
            let raw = value
                .get(mode.key())
                .ok_or_else(|| TimerError::invalid(mode.key(), "missing"))?;
            let minutes = raw
                .as_u64()
                .ok_or_else(|| TimerError::invalid(mode.key(), format!("{raw} is not a whole number")))?;
            u32::try_from(minutes)
                .map_err(|_| TimerError::invalid(mode.key(), format!("{minutes} is out of range")))
        };

        let config = Self {
            work: field(Mode::Work)?,
            short_break: field(Mode::ShortBreak)?,
            long_break: field(Mode::LongBreak)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Leniently interpret persisted settings.
    ///
    /// Corrupt JSON yields the defaults; individual fields that are missing,
    /// zero, negative or not integers fall back to their own default.
    pub fn from_json_lenient(raw: &str) -> Self {
        let defaults = Self::default();
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring malformed persisted settings: {}", e);
                return defaults;
            }
        };

        let field = |mode: Mode| -> u32 {
            match value
                .get(mode.key())
                .and_then(serde_json::Value::as_u64)
                .and_then(|minutes| u32::try_from(minutes).ok())
                .filter(|minutes| *minutes > 0)
            {
                Some(minutes) => minutes,
                None => {
                    tracing::debug!("Persisted {} duration unusable, using default", mode.key());
                    defaults.minutes(mode)
                }
            }
        };

        Self {
            work: field(Mode::Work),
            short_break: field(Mode::ShortBreak),
            long_break: field(Mode::LongBreak),
        }
    }
}

fn parse_minutes(field: &'static str, raw: &str) -> Result<u32, TimerError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimerError::invalid(field, "missing"));
    }
    let minutes: i64 = raw
        .parse()
        .map_err(|_| TimerError::invalid(field, format!("'{raw}' is not a whole number")))?;
    if minutes <= 0 {
        return Err(TimerError::invalid(
            field,
            "duration must be a positive number of minutes",
        ));
    }
    u32::try_from(minutes).map_err(|_| TimerError::invalid(field, format!("{minutes} is out of range")))
}

/// User configuration from FocusTimer Config.yaml
///
/// Host preferences. Any field may be omitted; environment variables
/// prefixed with `FOCUS_TIMER_` override the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
    pub debug_mode: bool,
    pub flush_interval_secs: u64,
    pub log_dir: String,
    pub data_dir: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notifications_enabled: true,
            debug_mode: false,
            flush_interval_secs: 30,
            log_dir: "logs".to_string(),
            data_dir: "FocusTimer Data".to_string(),
        }
    }
}

/// One keyword rule of the coach knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachRule {
    pub keywords: Vec<String>,
    pub responses: Vec<String>,
}

impl CoachRule {
    fn new(keywords: &[&str], responses: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            responses: responses.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Coach knowledge base from FocusTimer Coach.yaml
///
/// Rules are matched in file order, so the map must keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachConfig {
    #[serde(rename = "Rules")]
    pub rules: IndexMap<String, CoachRule>,

    #[serde(rename = "Fallback", default)]
    pub fallback: Vec<String>,
}

impl Default for CoachConfig {
    fn default() -> Self {
        let mut rules = IndexMap::new();

        rules.insert(
            "focus".to_string(),
            CoachRule::new(
                &["losing focus", "distracted", "can't focus", "help focus"],
                &[
                    "Take a deep breath ✨ Let's get through this session together. You've got this!",
                    "Try the 2-minute rule: commit to just 2 more minutes of focus. Often that's all you need to get back in the zone! 🌟",
                    "Remove distractions around you. Put your phone away, close extra tabs, and return to your one important task. 💪",
                ],
            ),
        );
        rules.insert(
            "technique".to_string(),
            CoachRule::new(
                &["pomodoro technique", "how does it work", "what is pomodoro"],
                &[
                    "The Pomodoro Technique is simple: 25 minutes of focused work, followed by a 5-minute break. After 4 rounds, you take a longer 15-minute break! 🍅",
                    "It's a time management method that breaks work into focused intervals. The magic is in the rhythm: work, rest, repeat! ⏰",
                ],
            ),
        );
        rules.insert(
            "breaks".to_string(),
            CoachRule::new(
                &["break", "what to do", "break ideas", "break time"],
                &[
                    "Step away from your screen 🌱 Stretch, drink water, or take a short walk. Avoid checking social media, it can drag you in!",
                    "Perfect break activities: light stretching, deep breathing, getting some fresh air, or just looking out the window 🌿",
                    "Use your break to move your body! Do some jumping jacks, stretch your neck, or walk around your space. Your brain needs the reset! 💫",
                ],
            ),
        );
        rules.insert(
            "settings".to_string(),
            CoachRule::new(
                &["settings", "customize", "timer", "duration", "change time"],
                &[
                    "You can customize your timer durations with the settings command! 25 minutes is the sweet spot for most people, but feel free to adjust. ⚙️",
                    "If you're just starting, try 15-20 minutes. Once you build the habit, you can extend to the full 25 minutes! 📈",
                    "Your custom settings are automatically saved, so we'll remember your preferred rhythm! 💾",
                ],
            ),
        );
        rules.insert(
            "motivation".to_string(),
            CoachRule::new(
                &["motivated", "motivation", "encourage", "support"],
                &[
                    "You're building something amazing, one focused session at a time! 🚀 Every minute of focused work counts.",
                    "Remember why you started. Each Pomodoro session is a step toward your goals! 🎯",
                    "Progress over perfection! You're already ahead of everyone who didn't start. Keep going! 💪",
                ],
            ),
        );
        rules.insert(
            "progress".to_string(),
            CoachRule::new(
                &["completed", "finished", "done", "sessions"],
                &[
                    "Fantastic! 🎉 Each completed session builds your focus muscle. You're developing a superpower!",
                    "Look at you go! 🌟 Consistency is key, and you're proving you can stick with it.",
                ],
            ),
        );
        rules.insert(
            "fatigue".to_string(),
            CoachRule::new(
                &["tired", "exhausted", "can't continue"],
                &[
                    "It's okay to feel tired! 😌 Consider taking a longer break or switching to lighter tasks. Listen to your body.",
                    "Mental fatigue is real. Maybe it's time for that long break, some water, or even calling it a productive day! 🌙",
                ],
            ),
        );
        rules.insert(
            "shortcuts".to_string(),
            CoachRule::new(
                &["shortcuts", "keyboard", "controls"],
                &[
                    "Great question! ⌨️ Type 'space' to play/pause the timer, and 'r' to reset. These shortcuts help you stay in flow!",
                    "Shortcuts: space (play/pause), r (reset), mode short|long|work to switch. Perfect for staying focused! 🎯",
                ],
            ),
        );
        rules.insert(
            "notifications".to_string(),
            CoachRule::new(
                &["notifications", "sound", "alerts"],
                &[
                    "I can send you desktop notifications when sessions end while you're away! 🔔",
                    "You can toggle sound notifications in your config file. I'll also keep the title updated with the countdown! 📢",
                ],
            ),
        );

        Self {
            rules,
            fallback: vec![
                "That's a great question! ✨ Remember, the Pomodoro Technique is all about focused work sessions followed by short breaks.".to_string(),
                "I'm here to help you stay productive! 🌟 Try asking me about focus tips, break ideas, or timer settings.".to_string(),
                "Every small step counts toward your goals! 💪 What specific area of productivity would you like to improve?".to_string(),
            ],
        }
    }
}
