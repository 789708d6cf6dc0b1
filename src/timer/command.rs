use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TimerError;
use crate::mode::mode::Mode;
use crate::render::render::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Reset,
    SwitchMode { mode: Mode },
    TogglePanel,
    Status,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
    pub view: Option<View>,
}

impl CommandResponse {
    pub fn ok(view: View) -> Self {
        Self {
            success: true,
            message: None,
            view: Some(view),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            view: None,
        }
    }
}

impl FromStr for Command {
    type Err = TimerError;

    /// Accepts a JSON command or plain words such as `start` or `mode essay`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.starts_with('{') {
            return Ok(serde_json::from_str(line)?);
        }
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_lowercase();
        match verb.as_str() {
            "start" | "play" | "s" => Ok(Command::Start),
            "pause" | "p" => Ok(Command::Pause),
            "reset" | "r" => Ok(Command::Reset),
            "toggle" | "panel" => Ok(Command::TogglePanel),
            "status" | "" => Ok(Command::Status),
            "mode" | "switch" | "m" => {
                let mode = words
                    .next()
                    .ok_or_else(|| TimerError::UnknownMode(String::new()))?
                    .parse()?;
                Ok(Command::SwitchMode { mode })
            }
            other => other
                .parse::<Mode>()
                .map(|mode| Command::SwitchMode { mode })
                .map_err(|_| TimerError::UnknownCommand(other.to_string())),
        }
    }
}
