// UI module - terminal front end and tokio glue
//
// This module contains:
// - bridge: TokioScheduler, the console task and its notification sink
// - commands: the command surface parsed from stdin
// - Controller: owns the engine and wires it to the terminal and the store

pub mod bridge;
pub mod commands;
pub mod controller;

pub use bridge::{ConsoleLine, ConsoleSender, ConsoleSink, TickFilter, TokioScheduler, run_console};
pub use commands::{Command, CommandError, read_commands};
pub use controller::{Controller, ControllerOptions};
