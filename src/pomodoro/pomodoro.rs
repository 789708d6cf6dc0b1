use serde::{Deserialize, Serialize};

use crate::mode::mode::ModeState;

pub const FOCUS_SECONDS: i64 = 25 * 60;
pub const SHORT_BREAK_SECONDS: i64 = 5 * 60;
pub const LONG_BREAK_SECONDS: i64 = 15 * 60;
pub const CYCLES_BEFORE_LONG_BREAK: u8 = 4;

pub const CYCLE_FINISHED_MESSAGE: &str = "Cycle finished!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
    Counting,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Focus => "FOCUS",
            Phase::ShortBreak => "SHORT BREAK",
            Phase::LongBreak => "LONG BREAK",
            Phase::Counting => "COUNTING",
        }
    }

    pub fn emoji(&self) -> &str {
        match self {
            Phase::Focus => "🔥",
            Phase::ShortBreak | Phase::LongBreak => "☕",
            Phase::Counting => "⏱",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Time to focus!",
            Phase::ShortBreak => "Short break (5m)",
            Phase::LongBreak => "Long break (15m)",
            Phase::Counting => "Counting",
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }
}

/// Moves a Pomodoro record to its next phase once its countdown hit zero.
/// Returns the phase that was left.
pub fn advance_phase(state: &mut ModeState) -> Phase {
    let left = state.phase;
    match state.phase {
        Phase::Focus => {
            if state.completed_focus_cycles + 1 >= CYCLES_BEFORE_LONG_BREAK {
                state.phase = Phase::LongBreak;
                state.time_value = LONG_BREAK_SECONDS;
                state.completed_focus_cycles = 0;
            } else {
                state.phase = Phase::ShortBreak;
                state.time_value = SHORT_BREAK_SECONDS;
                state.completed_focus_cycles += 1;
            }
        }
        Phase::ShortBreak | Phase::LongBreak | Phase::Counting => {
            state.phase = Phase::Focus;
            state.time_value = FOCUS_SECONDS;
        }
    }
    left
}

pub fn cycle_text(state: &ModeState) -> String {
    format!(
        "Cycle: {}/{}",
        state.completed_focus_cycles + 1,
        CYCLES_BEFORE_LONG_BREAK
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus(cycles: u8) -> ModeState {
        ModeState {
            time_value: 0,
            phase: Phase::Focus,
            completed_focus_cycles: cycles,
        }
    }

    #[test]
    fn test_focus_to_short_break() {
        for c in 0..3 {
            let mut state = focus(c);
            assert_eq!(advance_phase(&mut state), Phase::Focus);
            assert_eq!(state.phase, Phase::ShortBreak);
            assert_eq!(state.time_value, 300);
            assert_eq!(state.completed_focus_cycles, c + 1);
        }
    }

    #[test]
    fn test_fourth_focus_promotes_to_long_break() {
        let mut state = focus(3);
        advance_phase(&mut state);
        assert_eq!(state.phase, Phase::LongBreak);
        assert_eq!(state.time_value, 900);
        assert_eq!(state.completed_focus_cycles, 0);
    }

    #[test]
    fn test_breaks_return_to_focus() {
        for (phase, cycles) in [(Phase::ShortBreak, 2), (Phase::LongBreak, 0)] {
            let mut state = ModeState {
                time_value: 0,
                phase,
                completed_focus_cycles: cycles,
            };
            assert_eq!(advance_phase(&mut state), phase);
            assert_eq!(state.phase, Phase::Focus);
            assert_eq!(state.time_value, 1500);
            assert_eq!(state.completed_focus_cycles, cycles);
        }
    }

    #[test]
    fn test_cycle_text() {
        assert_eq!(cycle_text(&focus(0)), "Cycle: 1/4");
        assert_eq!(cycle_text(&focus(3)), "Cycle: 4/4");
    }
}
