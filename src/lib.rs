pub mod camera;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transcript;

pub use camera::{
    CameraBackend, CameraBackendConfig, CameraBackendFactory, CameraFrame, CameraSource,
};
pub use chat::{ChatError, ChatProvider, ChatSession, ChatTurn, ChunkReceiver, GeminiProvider, Role};
pub use config::Config;
pub use error::SessionError;
pub use http::{create_router, AppState};
pub use session::{InterviewSession, SessionConfig, SessionState, SessionStats};
pub use transcript::{Message, Speaker, Transcript};
