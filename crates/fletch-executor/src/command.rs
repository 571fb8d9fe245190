use std::fmt;

use serde::{Deserialize, Serialize};

/// A single instruction for the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Continuous yaw rate in [-1, 1].
    Turn(f64),
    /// Continuous pitch rate in [-1, 1].
    Pitch(f64),
    /// Hold (`true`) or release (`false`) the use button, which draws and
    /// looses the bow.
    Use(bool),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Turn(rate) => write!(f, "turn {}", rate),
            Command::Pitch(rate) => write!(f, "pitch {}", rate),
            Command::Use(active) => write!(f, "use {}", u8::from(*active)),
        }
    }
}

/// Where the engine sends its commands. Commands are fire and forget.
pub trait CommandSink {
    fn turn(&mut self, rate: f64);

    fn pitch(&mut self, rate: f64);

    fn use_item(&mut self, active: bool);
}

impl<S: CommandSink + ?Sized> CommandSink for &mut S {
    fn turn(&mut self, rate: f64) {
        (**self).turn(rate)
    }

    fn pitch(&mut self, rate: f64) {
        (**self).pitch(rate)
    }

    fn use_item(&mut self, active: bool) {
        (**self).use_item(active)
    }
}

/// Keeps every command it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Vec<Command>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Remove and return everything recorded so far.
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn last_turn(&self) -> Option<f64> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::Turn(rate) => Some(*rate),
            _ => None,
        })
    }

    pub fn last_pitch(&self) -> Option<f64> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::Pitch(rate) => Some(*rate),
            _ => None,
        })
    }
}

impl CommandSink for RecordingSink {
    fn turn(&mut self, rate: f64) {
        self.commands.push(Command::Turn(rate));
    }

    fn pitch(&mut self, rate: f64) {
        self.commands.push(Command::Pitch(rate));
    }

    fn use_item(&mut self, active: bool) {
        self.commands.push(Command::Use(active));
    }
}
