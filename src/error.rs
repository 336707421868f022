use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine a data directory, pass --root or set $TASKTIMER_ROOT")]
    NoProjectDirs,
}
