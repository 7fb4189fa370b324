//! Property tests for the focus cycle
//!
//! - Every 4th completed work session leads to a long break
//! - Ticks never complete a session early and never underflow
//! - Manual switches and resets never change the session count

use focus_timer::services::{format_clock, ring_offset};
use focus_timer::{ManualScheduler, Mode, TimerConfig, TimerEngine};
use proptest::prelude::*;

fn engine(config: TimerConfig, sessions: u64) -> TimerEngine {
    TimerEngine::new(config, sessions, ManualScheduler::new()).unwrap()
}

fn mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Work), Just(Mode::ShortBreak), Just(Mode::LongBreak)]
}

#[derive(Debug, Clone)]
enum Op {
    Start,
    Pause,
    Toggle,
    Reset,
    Tick,
    Switch(Mode),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        1 => Just(Op::Pause),
        1 => Just(Op::Toggle),
        1 => Just(Op::Reset),
        4 => Just(Op::Tick),
        1 => mode_strategy().prop_map(Op::Switch),
    ]
}

proptest! {
    #[test]
    fn prop_cadence_law(n in 1u64..10_000) {
        let expected = if n % 4 == 0 { Mode::LongBreak } else { Mode::ShortBreak };
        prop_assert_eq!(Mode::break_after(n), expected);
    }

    #[test]
    fn prop_completion_follows_cadence(prior in 0u64..1_000) {
        let mut engine = engine(TimerConfig::new(1, 1, 1), prior);
        engine.start();
        for _ in 0..60 {
            engine.tick();
        }

        prop_assert_eq!(engine.sessions_completed(), prior + 1);
        prop_assert_eq!(engine.mode(), Mode::break_after(prior + 1));
        prop_assert!(!engine.is_running());
    }

    #[test]
    fn prop_ticks_below_duration_only_decrement(work in 1u32..30, ticks in 0u64..60) {
        let mut engine = engine(TimerConfig::new(work, 5, 15), 0);
        let full = engine.remaining_seconds();
        prop_assume!(ticks < full);

        engine.start();
        for _ in 0..ticks {
            engine.tick();
        }

        prop_assert_eq!(engine.remaining_seconds(), full - ticks);
        prop_assert_eq!(engine.mode(), Mode::Work);
        prop_assert!(engine.is_running());
        prop_assert_eq!(engine.sessions_completed(), 0);
    }

    #[test]
    fn prop_switch_mode_postconditions(
        mode in mode_strategy(),
        ticks in 0usize..100,
        sessions in 0u64..100,
    ) {
        let config = TimerConfig::new(25, 5, 15);
        let mut engine = engine(config, sessions);
        engine.start();
        for _ in 0..ticks {
            engine.tick();
        }

        engine.switch_mode(mode);
        prop_assert_eq!(engine.mode(), mode);
        prop_assert_eq!(engine.remaining_seconds(), config.duration_secs(mode));
        prop_assert!(!engine.is_running());
        prop_assert_eq!(engine.sessions_completed(), sessions);
    }

    #[test]
    fn prop_invariants_hold_under_any_ops(ops in prop::collection::vec(op_strategy(), 0..400)) {
        let scheduler = ManualScheduler::new();
        let mut engine = TimerEngine::new(TimerConfig::new(1, 1, 1), 0, scheduler.clone()).unwrap();

        let mut last_count = 0;
        for op in ops {
            match op {
                Op::Start => { engine.start(); }
                Op::Pause => { engine.pause(); }
                Op::Toggle => { engine.toggle(); }
                Op::Reset => { engine.reset(); }
                Op::Tick => { engine.tick(); }
                Op::Switch(mode) => { engine.switch_mode(mode); }
            }

            prop_assert!(engine.remaining_seconds() <= engine.full_duration());
            prop_assert_eq!(scheduler.active_registrations(), usize::from(engine.is_running()));
            prop_assert!(engine.sessions_completed() >= last_count);
            prop_assert!(engine.sessions_completed() <= last_count + 1);
            let fraction = engine.progress_fraction();
            prop_assert!((0.0..=1.0).contains(&fraction));
            last_count = engine.sessions_completed();
        }
    }

    #[test]
    fn prop_clock_format(seconds in 0u64..6000) {
        let clock = format_clock(seconds);
        let (minutes, secs) = clock.split_once(':').unwrap();
        prop_assert_eq!(minutes.parse::<u64>().unwrap() * 60 + secs.parse::<u64>().unwrap(), seconds);
        prop_assert_eq!(secs.len(), 2);
        prop_assert!(minutes.len() >= 2);
    }

    #[test]
    fn prop_ring_offset_bounded(fraction in -1.0f64..2.0) {
        let offset = ring_offset(fraction);
        prop_assert!(offset >= 0.0);
        prop_assert!(offset <= ring_offset(0.0));
    }
}
