use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Arc, Mutex};

use chrono::Local;
use notify_rust::Notification;

use crate::error::Result;
#[cfg(test)]
use crate::error::TimerError;

pub const TIME_EXPIRED_MESSAGE: &str = "Time's up!";

pub trait Notifier: Send {
    fn notify(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        Notification::new()
            .summary("PreparAI - Study Timer")
            .body(&format!("⏰ {}", message))
            .timeout(0) // No auto-dismiss
            .show()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let log = Self { path };
        log.append(&format!(
            "=== Session started at {} ===",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ))?;
        Ok(log)
    }

    pub fn append(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", message)?;
        Ok(())
    }
}

impl Notifier for ActivityLog {
    fn notify(&self, message: &str) -> Result<()> {
        self.append(&format!(
            "[{}] 🔔 {}",
            Local::now().format("%H:%M:%S"),
            message
        ))
    }
}

/// Fans a message out to every sink. One failing sink does not stop the
/// others; the first error is returned after all have been tried.
#[derive(Default)]
pub struct Alerts {
    sinks: Vec<Box<dyn Notifier>>,
}

impl Alerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl Notifier + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl Notifier for Alerts {
    fn notify(&self, message: &str) -> Result<()> {
        log::info!("🔔 {}", message);
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.notify(message) {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the message and then reports a delivery failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
        if self.fail {
            return Err(TimerError::Io(std::io::Error::other("sound blocked")));
        }
        Ok(())
    }
}
