use crate::chat::ChatProvider;
use crate::session::{InterviewSession, SessionConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active interview sessions (interview_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<InterviewSession>>>>,

    /// Chat provider shared by all sessions
    pub provider: Arc<dyn ChatProvider>,

    /// Per-request session configs are derived from this template
    pub template: SessionConfig,
}

impl AppState {
    pub fn new(provider: Arc<dyn ChatProvider>, template: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            provider,
            template,
        }
    }
}
