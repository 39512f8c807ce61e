use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interview lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Not started, or stopped/rolled back after a failure
    Idle,
    /// Camera and chat session are being acquired
    Initializing,
    /// Interview in progress
    Active,
    /// Camera acquisition failed; no chat session exists
    Error,
}

/// Snapshot of an interview session's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Current lifecycle state
    pub state: SessionState,

    /// Description of the most recent failure, if any
    pub error: Option<String>,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Number of transcript messages so far
    pub messages: usize,

    /// Number of camera frames captured so far
    pub frames_captured: usize,

    /// Whether a reply is currently being streamed
    pub reply_pending: bool,
}
