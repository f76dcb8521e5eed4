// Message types exchanged with the controlling client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested motor motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    Stop,
    StopAll,
    // Anything unrecognised, including a missing direction
    #[default]
    #[serde(other)]
    Invalid,
}

impl Direction {
    /// Map a raw direction token to a known direction
    pub fn from_token(token: &str) -> Self {
        match token {
            "forward" => Direction::Forward,
            "backward" => Direction::Backward,
            "stop" => Direction::Stop,
            "stop_all" => Direction::StopAll,
            _ => Direction::Invalid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Stop => "stop",
            Direction::StopAll => "stop_all",
            Direction::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Command from client -> runtime, one per received payload
// Field order matches what clients send: {"motor":1,"direction":"forward","speed":200}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Command {
    pub motor: i32,
    pub direction: Direction,
    pub speed: i32,
}

/// Text reply sent back for every command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Forward,
    Backward,
    Stopped,
    AllStopped,
    InvalidCommand,
}

impl Response {
    pub fn as_str(&self) -> &'static str {
        match self {
            Response::Forward => "forward\n",
            Response::Backward => "backward\n",
            Response::Stopped => "stopped\n",
            Response::AllStopped => "all motors stopped\n",
            Response::InvalidCommand => "invalid command\n",
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}
