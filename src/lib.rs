//! Persistent multi-mode study timer: Pomodoro cycles, an essay stopwatch
//! and a mock-exam countdown that survive restarts.

pub mod clock;
pub mod config;
pub mod error;
pub mod mode;
pub mod notify;
pub mod pomodoro;
pub mod render;
pub mod storage;
pub mod timer;
pub mod ws;

pub use error::{Result, TimerError};
