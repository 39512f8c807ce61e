//! Interview session management
//!
//! This module provides the `InterviewSession` abstraction that manages:
//! - Camera acquisition and release
//! - The chat session with the interviewer model
//! - Streaming replies into the transcript
//! - Session state and statistics

mod config;
mod session;
mod stats;

pub use config::{SessionConfig, DEFAULT_SYSTEM_INSTRUCTION, GREETING_PROMPT};
pub use session::InterviewSession;
pub use stats::{SessionState, SessionStats};
