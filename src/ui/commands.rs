// Command surface - the keyboard shortcuts and buttons of the terminal UI
//
// Every line typed on stdin is parsed into a Command and forwarded to the
// controller. Parse errors are reported on the console and never stop the
// timer.

use super::bridge::{ConsoleLine, ConsoleSender};
use crate::models::{Mode, ParseModeError, TimerConfig, TimerError};
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

pub const HELP_TEXT: &str = "\
Commands:
  space | t | toggle        start or pause the timer
  start / pause             start or pause explicitly
  r | reset                 rewind the current session
  1 | 2 | 3                 switch to work / short break / long break
  mode <work|short|long>    switch mode
  settings <w> <s> <l>      set durations in minutes
  status                    show the current state
  say <text> | ? <text>     ask the focus coach
  away / back               mark the app as unfocused / focused
  help                      show this help
  q | quit                  save and exit";

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle,
    Start,
    Pause,
    Reset,
    SwitchMode(Mode),
    ApplySettings(TimerConfig),
    Status,
    Chat(String),
    Away,
    Back,
    Help,
    Quit,
}

/// Errors raised while parsing a command line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for the list of commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Mode(#[from] ParseModeError),

    #[error(transparent)]
    Settings(#[from] TimerError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // A bare space is the toggle shortcut, so only trim the line ending
        let line = line.trim_end_matches(['\r', '\n']);
        if line == " " {
            return Ok(Command::Toggle);
        }

        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_lowercase().as_str() {
            "space" | "t" | "toggle" => Command::Toggle,
            "start" => Command::Start,
            "pause" | "p" => Command::Pause,
            "r" | "reset" => Command::Reset,
            "1" => Command::SwitchMode(Mode::Work),
            "2" => Command::SwitchMode(Mode::ShortBreak),
            "3" => Command::SwitchMode(Mode::LongBreak),
            "mode" | "m" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("mode <work|short|long>"));
                }
                Command::SwitchMode(rest.parse()?)
            }
            "settings" | "set" => {
                let fields: Vec<&str> = rest.split_whitespace().collect();
                let [work, short_break, long_break] = fields.as_slice() else {
                    return Err(CommandError::Usage("settings <work> <short> <long>"));
                };
                Command::ApplySettings(TimerConfig::parse(work, short_break, long_break)?)
            }
            "status" | "s" => Command::Status,
            "say" | "?" | "ask" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("say <text>"));
                }
                Command::Chat(rest.to_string())
            }
            "away" => Command::Away,
            "back" => Command::Back,
            "help" | "h" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "" => return Err(CommandError::Unknown(String::new())),
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Read commands line by line until EOF, then request a quit.
///
/// Blank lines are ignored. Returns when the input ends or the controller
/// stops listening.
pub async fn read_commands<R>(input: R, commands: mpsc::Sender<Command>, console: ConsoleSender)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read command input: {}", e);
                break;
            }
        };

        if line.trim().is_empty() && line != " " {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                tracing::debug!("Command: {:?}", command);
                let quit = command == Command::Quit;
                if commands.send(command).await.is_err() || quit {
                    return;
                }
            }
            Err(e) => {
                let _ = console.send(ConsoleLine::Message(e.to_string()));
            }
        }
    }

    tracing::debug!("Command input closed");
    let _ = commands.send(Command::Quit).await;
}
