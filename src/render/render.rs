use std::io::Write;

use serde::Serialize;
use tokio::sync::watch;

use crate::clock::clock::ClockState;
use crate::mode::mode::Mode;
use crate::pomodoro::pomodoro::{self, Phase};

pub const APP_TITLE: &str = "PreparAI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub mode: Mode,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub panel_open: bool,
    pub tabs: Vec<Tab>,
    pub mode: Mode,
    pub phase: Phase,
    pub time_text: String,
    pub label: String,
    pub on_break: bool,
    pub cycle_text: Option<String>,
    pub play_visible: bool,
    pub pause_visible: bool,
    pub title: String,
}

/// `HH:MM:SS` when there are hours to show or in the mock exam, `MM:SS`
/// otherwise.
pub fn format_time(seconds: i64, mode: Mode) -> String {
    let seconds = seconds.max(0);
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 || mode == Mode::MockExam {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

impl View {
    pub fn from_state(state: &ClockState, panel_open: bool) -> Self {
        let mode = state.active_mode;
        let current = state.active();
        let time_text = format_time(current.time_value, mode);

        let (label, cycle_text) = match mode {
            Mode::Pomodoro => (
                format!("{} {}", current.phase.emoji(), current.phase.label()),
                Some(pomodoro::cycle_text(current)),
            ),
            Mode::Essay => ("✏️ Writing time".to_string(), None),
            Mode::MockExam => ("⏰ Time remaining".to_string(), None),
        };

        let tabs = Mode::ALL
            .iter()
            .map(|&m| Tab {
                mode: m,
                label: format!("{} {}", m.emoji(), m.tab_label()),
                active: m == mode,
            })
            .collect();

        let title = if state.is_running {
            format!("{} - {}", time_text, APP_TITLE)
        } else {
            APP_TITLE.to_string()
        };

        Self {
            panel_open,
            tabs,
            mode,
            phase: current.phase,
            time_text,
            label,
            on_break: current.phase.is_break(),
            cycle_text,
            play_visible: !state.is_running,
            pause_visible: state.is_running,
            title,
        }
    }

    pub fn status_line(&self) -> String {
        let mut line = format!("{} | {} | {}", self.mode.as_str(), self.label, self.time_text);
        if let Some(ref cycle) = self.cycle_text {
            line.push_str(" | ");
            line.push_str(cycle);
        }
        line.push_str(if self.pause_visible { " | ▶ running" } else { " | ⏸ paused" });
        line
    }
}

pub trait Renderer: Send {
    fn render(&mut self, view: &View);
}

#[derive(Debug, Default)]
pub struct TerminalRenderer {
    last_line: String,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, view: &View) {
        if !view.panel_open {
            return;
        }
        let line = view.status_line();
        if line == self.last_line {
            return;
        }
        let mut out = std::io::stdout();
        let _ = write!(out, "\r\x1b[2K{}", line);
        let _ = out.flush();
        self.last_line = line;
    }
}

pub struct WatchRenderer {
    tx: watch::Sender<Option<View>>,
}

impl WatchRenderer {
    pub fn new() -> (Self, watch::Receiver<Option<View>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

impl Renderer for WatchRenderer {
    fn render(&mut self, view: &View) {
        self.tx.send_replace(Some(view.clone()));
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub views: std::sync::Arc<std::sync::Mutex<Vec<View>>>,
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn render(&mut self, view: &View) {
        if let Ok(mut views) = self.views.lock() {
            views.push(view.clone());
        }
    }
}
