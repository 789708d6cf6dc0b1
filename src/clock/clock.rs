use serde::{Deserialize, Serialize};

use crate::mode::mode::{Direction, Mode, ModeState};
use crate::pomodoro::pomodoro::{self, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTable {
    pub pomodoro: ModeState,
    pub essay: ModeState,
    pub mock_exam: ModeState,
}

impl ModeTable {
    pub fn get(&self, mode: Mode) -> &ModeState {
        match mode {
            Mode::Pomodoro => &self.pomodoro,
            Mode::Essay => &self.essay,
            Mode::MockExam => &self.mock_exam,
        }
    }

    pub fn get_mut(&mut self, mode: Mode) -> &mut ModeState {
        match mode {
            Mode::Pomodoro => &mut self.pomodoro,
            Mode::Essay => &mut self.essay,
            Mode::MockExam => &mut self.mock_exam,
        }
    }
}

impl Default for ModeTable {
    fn default() -> Self {
        Self {
            pomodoro: Mode::Pomodoro.default_state(),
            essay: Mode::Essay.default_state(),
            mock_exam: Mode::MockExam.default_state(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub active_mode: Mode,
    pub modes: ModeTable,
    pub is_running: bool,
    pub last_sample_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Idle,
    Counted,
    PhaseChanged { from: Phase, to: Phase },
    Expired,
}

impl ClockState {
    pub fn new(now_ms: i64) -> Self {
        Self {
            active_mode: Mode::Pomodoro,
            modes: ModeTable::default(),
            is_running: false,
            last_sample_ms: now_ms,
        }
    }

    pub fn active(&self) -> &ModeState {
        self.modes.get(self.active_mode)
    }

    pub fn reset_active(&mut self) {
        let mode = self.active_mode;
        *self.modes.get_mut(mode) = mode.default_state();
    }

    pub fn sanitize(&mut self) {
        for mode in Mode::ALL {
            self.modes.get_mut(mode).sanitize(mode);
        }
    }

    /// Applies `delta` whole seconds to the active mode.
    ///
    /// Countdowns clamp at zero. At most one Pomodoro phase transition is
    /// performed per call; any overshoot past the new phase is dropped.
    /// Expiry of the mock exam is reported but pausing is left to the caller.
    pub fn advance(&mut self, delta: i64) -> Advance {
        if delta <= 0 {
            return Advance::Idle;
        }
        let mode = self.active_mode;
        let state = self.modes.get_mut(mode);

        match mode.direction() {
            Direction::Up => {
                state.time_value = state.time_value.saturating_add(delta);
                Advance::Counted
            }
            Direction::Down => {
                let remaining = state.time_value.saturating_sub(delta);
                if remaining > 0 {
                    state.time_value = remaining;
                    return Advance::Counted;
                }
                state.time_value = 0;
                match mode {
                    Mode::Pomodoro => {
                        let from = pomodoro::advance_phase(state);
                        Advance::PhaseChanged {
                            from,
                            to: state.phase,
                        }
                    }
                    _ => Advance::Expired,
                }
            }
        }
    }
}

pub fn elapsed_seconds(last_ms: i64, now_ms: i64) -> i64 {
    let diff = now_ms.saturating_sub(last_ms);
    if diff <= 0 { 0 } else { diff / 1000 }
}
