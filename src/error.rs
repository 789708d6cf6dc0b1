use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("notification failed: {0}")]
    Notify(#[from] notify_rust::error::Error),

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, TimerError>;
