// Focus coach
//
// Canned-response assistant. Answers free text from an ordered keyword
// table and reacts to timer lifecycle events with short messages.

use crate::models::{CoachConfig, Mode, SESSIONS_PER_LONG_BREAK, TimerConfig};
use crate::state::TimerEvent;
use rand::Rng;
use std::fmt;

const LONG_BREAK_POOL: &[&str] = &[
    "Amazing work! 🎉 You've completed {sessions} sessions. Time for your well-deserved {long}-minute long break!",
    "Time for your long break! 🎉 You've earned {long} minutes to truly disconnect and recharge.",
    "Excellent work! This longer break is crucial. Step outside, have a snack, or just relax. 🌞",
    "Four sessions complete! 🏆 Take this time to celebrate your progress and reset completely.",
];

const SHORT_BREAK_POOL: &[&str] = &[
    "Great job finishing that focus session! 🌟 Take a {short}-minute break and come back refreshed.",
    "Break time! 🌿 Step away from the screen and let your mind reset.",
    "Perfect timing for a break! Get some water, stretch, or take a few deep breaths. 💧",
    "Your brain earned this rest! Use these {short} minutes to recharge fully. ✨",
];

const BACK_TO_WORK_POOL: &[&str] = &[
    "Break's over! 💪 Ready to dive into another productive focus session?",
    "Let's focus! 🎯 Remove distractions and tackle your most important task first.",
    "You've got {work} minutes of pure focus ahead. What's the one thing you want to accomplish? 💪",
    "New session, fresh start! 🌟 Set a clear intention for these next {work} minutes.",
];

const HALFWAY_POOL: &[&str] = &[
    "You're halfway through! 🔥 Keep that momentum going!",
    "Great progress! ⚡ You've got this, stay focused!",
    "Halfway there! 🌟 Your brain is in the flow zone now.",
];

/// Chooses one response out of a pool.
///
/// `pick(len)` is only called with `len > 0` and must return an index below
/// `len`. Closures `FnMut(usize) -> usize` implement it, which makes replies
/// deterministic in tests.
pub trait ResponsePicker: Send {
    fn pick(&mut self, len: usize) -> usize;
}

impl<F> ResponsePicker for F
where
    F: FnMut(usize) -> usize + Send,
{
    fn pick(&mut self, len: usize) -> usize {
        self(len)
    }
}

/// Uniform choice using the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl ResponsePicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

#[derive(Debug)]
struct Rule {
    name: String,
    keywords: Vec<String>,
    responses: Vec<String>,
}

/// Keyword-matching coach.
///
/// Tracks the current durations from `SettingsChanged` events so event
/// messages quote the configured minutes.
pub struct Coach {
    rules: Vec<Rule>,
    fallback: Vec<String>,
    durations: TimerConfig,
    picker: Box<dyn ResponsePicker>,
}

impl Coach {
    /// Build a coach that picks responses at random.
    pub fn new(config: CoachConfig) -> Self {
        Self::with_picker(config, RandomPicker)
    }

    pub fn with_picker<P>(config: CoachConfig, picker: P) -> Self
    where
        P: ResponsePicker + 'static,
    {
        let rules = config
            .rules
            .into_iter()
            .filter_map(|(name, rule)| {
                if rule.responses.is_empty() {
                    tracing::warn!("Coach rule '{}' has no responses, skipping", name);
                    return None;
                }
                Some(Rule {
                    name,
                    keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
                    responses: rule.responses,
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Coach loaded {} rules and {} fallback responses",
            rules.len(),
            config.fallback.len()
        );

        Self {
            rules,
            fallback: config.fallback,
            durations: TimerConfig::default(),
            picker: Box::new(picker),
        }
    }

    /// Durations quoted in event messages.
    pub fn set_durations(&mut self, durations: TimerConfig) {
        self.durations = durations;
    }

    /// Name of the first rule whose keywords occur in `input`.
    pub fn matched_rule(&self, input: &str) -> Option<&str> {
        let lower = input.to_lowercase();
        self.find_rule(&lower).map(|rule| rule.name.as_str())
    }

    /// Answer a free-text message.
    ///
    /// Blank input yields `None`. Input matching no rule is answered from
    /// the fallback pool.
    pub fn reply(&mut self, input: &str) -> Option<String> {
        let lower = input.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        let pool = match self.find_rule(&lower) {
            Some(rule) => {
                tracing::debug!("Coach matched rule '{}'", rule.name);
                rule.responses.clone()
            }
            None => self.fallback.clone(),
        };
        self.choose(&pool)
    }

    /// React to a timer event, if it warrants a message.
    pub fn on_event(&mut self, event: &TimerEvent) -> Option<String> {
        match event {
            TimerEvent::SessionComplete {
                mode: Mode::Work,
                sessions_completed,
            } => {
                let pool = if sessions_completed % SESSIONS_PER_LONG_BREAK == 0 {
                    LONG_BREAK_POOL
                } else {
                    SHORT_BREAK_POOL
                };
                self.choose_template(pool, *sessions_completed)
            }
            TimerEvent::SessionComplete { sessions_completed, .. } => {
                self.choose_template(BACK_TO_WORK_POOL, *sessions_completed)
            }
            TimerEvent::HalfwayPoint { mode: Mode::Work } => self.choose_template(HALFWAY_POOL, 0),
            TimerEvent::SettingsChanged { config } => {
                self.durations = *config;
                None
            }
            _ => None,
        }
    }

    fn find_rule(&self, lower: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
    }

    fn choose(&mut self, pool: &[String]) -> Option<String> {
        if pool.is_empty() {
            return None;
        }
        let index = self.picker.pick(pool.len()).min(pool.len() - 1);
        Some(pool[index].clone())
    }

    fn choose_template(&mut self, pool: &[&str], sessions: u64) -> Option<String> {
        let index = self.picker.pick(pool.len()).min(pool.len() - 1);
        Some(
            pool[index]
                .replace("{sessions}", &sessions.to_string())
                .replace("{work}", &self.durations.work.to_string())
                .replace("{short}", &self.durations.short_break.to_string())
                .replace("{long}", &self.durations.long_break.to_string()),
        )
    }
}

impl fmt::Debug for Coach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coach")
            .field("rules", &self.rules.len())
            .field("fallback", &self.fallback.len())
            .field("durations", &self.durations)
            .finish_non_exhaustive()
    }
}
