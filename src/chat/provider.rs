use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Role in the provider-side conversation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The candidate
    User,
    /// The AI interviewer
    Model,
}

impl Role {
    /// Wire name expected by the chat API
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One turn of provider-side conversation history
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Chat API failures
#[derive(Debug, Error)]
pub enum ChatError {
    /// Request could not be sent (DNS, connect, TLS)
    #[error("chat request failed: {0}")]
    Http(String),

    /// The API rejected the request
    #[error("chat API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The reply stream broke or delivered an unreadable payload
    #[error("reply stream interrupted: {0}")]
    Stream(String),

    /// The configured credential environment variable is not set
    #[error("missing API credential: set {0}")]
    MissingCredential(String),
}

/// Receiver side of a streamed reply: text fragments, terminating when the
/// reply is complete. An `Err` item ends the stream.
pub type ChunkReceiver = mpsc::Receiver<Result<String, ChatError>>;

/// A remote conversational AI, abstracted to the one operation the session
/// controller needs: given the fixed system instruction and the history so
/// far, stream back the model's next reply.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[ChatTurn],
    ) -> Result<ChunkReceiver, ChatError>;
}
