use super::provider::{ChatError, ChatProvider, ChatTurn, ChunkReceiver, Role};
use std::sync::Arc;

/// Handle to one remote conversational context: the fixed system
/// instruction plus the history sent with every turn. The provider itself
/// is stateless; this is the only place the conversation lives.
pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    system_instruction: String,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn open(provider: Arc<dyn ChatProvider>, system_instruction: impl Into<String>) -> Self {
        Self {
            provider,
            system_instruction: system_instruction.into(),
            history: Vec::new(),
        }
    }

    /// Record the user turn and open a streamed reply.
    ///
    /// The user turn stays in history even if the reply later fails, so the
    /// provider sees the same conversation the transcript shows.
    pub async fn send(&mut self, text: &str) -> Result<ChunkReceiver, ChatError> {
        self.history.push(ChatTurn {
            role: Role::User,
            text: text.to_string(),
        });
        self.provider
            .stream_reply(&self.system_instruction, &self.history)
            .await
    }

    /// Record a completed model reply
    pub fn commit_reply(&mut self, text: impl Into<String>) {
        self.history.push(ChatTurn {
            role: Role::Model,
            text: text.into(),
        });
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}
