use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TimerError;
use crate::pomodoro::pomodoro::{FOCUS_SECONDS, Phase};

pub const ESSAY_START_SECONDS: i64 = 0;
pub const MOCK_EXAM_SECONDS: i64 = 5 * 60 * 60; // 5h, length of a full exam day

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Pomodoro,
    Essay,
    MockExam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Per-mode clock record. `time_value` is remaining seconds for countdown
/// modes and elapsed seconds for count-up modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    pub time_value: i64,
    pub phase: Phase,
    #[serde(default)]
    pub completed_focus_cycles: u8,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Pomodoro, Mode::Essay, Mode::MockExam];

    pub fn default_state(self) -> ModeState {
        match self {
            Mode::Pomodoro => ModeState {
                time_value: FOCUS_SECONDS,
                phase: Phase::Focus,
                completed_focus_cycles: 0,
            },
            Mode::Essay => ModeState {
                time_value: ESSAY_START_SECONDS,
                phase: Phase::Counting,
                completed_focus_cycles: 0,
            },
            Mode::MockExam => ModeState {
                time_value: MOCK_EXAM_SECONDS,
                phase: Phase::Counting,
                completed_focus_cycles: 0,
            },
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Mode::Essay => Direction::Up,
            Mode::Pomodoro | Mode::MockExam => Direction::Down,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Pomodoro => "pomodoro",
            Mode::Essay => "essay",
            Mode::MockExam => "mock_exam",
        }
    }

    pub fn tab_label(&self) -> &'static str {
        match self {
            Mode::Pomodoro => "Pomodoro",
            Mode::Essay => "Essay",
            Mode::MockExam => "Mock exam",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mode::Pomodoro => "🍅",
            Mode::Essay => "📝",
            Mode::MockExam => "🎓",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pomodoro" | "pomo" => Ok(Mode::Pomodoro),
            "essay" | "writing" => Ok(Mode::Essay),
            "mock_exam" | "mock-exam" | "exam" => Ok(Mode::MockExam),
            other => Err(TimerError::UnknownMode(other.to_string())),
        }
    }
}

impl ModeState {
    pub fn sanitize(&mut self, mode: Mode) {
        if self.time_value < 0 {
            self.time_value = 0;
        }
        match mode {
            Mode::Pomodoro => {
                if self.phase == Phase::Counting {
                    self.phase = Phase::Focus;
                }
                self.completed_focus_cycles = self.completed_focus_cycles.min(3);
            }
            Mode::Essay | Mode::MockExam => {
                self.phase = Phase::Counting;
                self.completed_focus_cycles = 0;
            }
        }
    }
}
