use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The candidate being interviewed
    User,
    /// The AI interviewer
    Assistant,
}

/// A single entry in the interview transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who said it
    pub speaker: Speaker,

    /// Message text (grows incrementally while a streamed reply is arriving)
    pub text: String,

    /// When the entry was first appended
    pub timestamp: DateTime<Utc>,
}

/// Ordered record of the interview conversation.
///
/// Append-only, except that the most recent entry may be amended in place
/// while a streamed reply is still arriving, and rolled back if that reply
/// fails partway through.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.messages.push(Message {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// Append streamed text to the most recent entry
    pub fn amend_last(&mut self, chunk: &str) {
        if let Some(last) = self.messages.last_mut() {
            last.text.push_str(chunk);
        }
    }

    /// Remove the most recent entry (failed-reply rollback)
    pub fn rollback_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Clone the current entries for use outside the transcript lock
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
