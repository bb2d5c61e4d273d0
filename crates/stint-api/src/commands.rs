//! Commands accepted from the shell

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Operator commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Start ticking through the schedule
    Start,
    /// Stop and cancel pending notifications
    Stop,
    /// Start if stopped, stop if running
    Toggle,
    /// Print the current display snapshot
    Status,
    /// Print the computed schedule
    Schedule,
    /// Stop and exit
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown command '{0}' (expected start, stop, toggle, status, schedule or quit)")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "toggle" | "t" => Ok(Command::Toggle),
            "status" | "s" => Ok(Command::Status),
            "schedule" => Ok(Command::Schedule),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}
