//! Streaming chat client for the hosted interviewer model
//!
//! The session controller only ever needs two operations from the vendor
//! API: open a conversational context with a fixed system instruction, and
//! stream the model's next reply. `ChatProvider` captures exactly that, so
//! tests can script replies without a network.

mod gemini;
mod provider;
mod session;

pub use gemini::{extract_chunk_text, sse_data, GeminiProvider, SseLines};
pub use provider::{ChatError, ChatProvider, ChatTurn, ChunkReceiver, Role};
pub use session::ChatSession;
