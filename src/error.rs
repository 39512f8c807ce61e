use thiserror::Error;

/// Recoverable interview-session failures, surfaced to the client as
/// readable text. None of these is fatal to the process; the client may
/// retry by starting a fresh interview.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Camera permission denied or device unavailable
    #[error("camera unavailable: {0}")]
    Camera(String),

    /// Opening the remote chat session failed (network/auth)
    #[error("failed to open interview session: {0}")]
    SessionInit(String),

    /// A mid-conversation send failed; partial reply text was discarded
    #[error("message delivery failed: {0}")]
    Message(String),
}
