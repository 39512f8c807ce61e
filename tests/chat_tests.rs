// Tests for the streaming chat client: SSE parsing and the chat session
// history handle.

use ai_interviewer::chat::{
    extract_chunk_text, sse_data, ChatError, ChatProvider, ChatSession, ChatTurn, ChunkReceiver,
    Role, SseLines,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

#[test]
fn test_sse_lines_reassembles_split_chunks() {
    // Network chunks do not respect line boundaries
    let mut lines = SseLines::new();

    lines.push(b"data: {\"part\"");
    assert_eq!(lines.next_line(), None, "No full line buffered yet");

    lines.push(b": 1}\r\ndata: {\"part\": 2}\n");
    assert_eq!(lines.next_line().as_deref(), Some("data: {\"part\": 1}"));
    assert_eq!(lines.next_line().as_deref(), Some("data: {\"part\": 2}"));
    assert_eq!(lines.next_line(), None);
}

#[test]
fn test_sse_data_extraction() {
    assert_eq!(sse_data("data: {\"x\":1}"), Some("{\"x\":1}"));
    assert_eq!(sse_data("data:{\"x\":1}"), Some("{\"x\":1}"));
    assert_eq!(sse_data(""), None, "Blank keep-alive lines carry no data");
    assert_eq!(sse_data("event: ping"), None);
}

#[test]
fn test_extract_chunk_text_from_reply_payload() -> Result<()> {
    let payload = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;

    let text = extract_chunk_text(payload)?;

    assert_eq!(text.as_deref(), Some("Hello"));
    Ok(())
}

#[test]
fn test_extract_chunk_text_skips_textless_payloads() -> Result<()> {
    // Safety/usage chunks carry candidates but no text parts
    let payload = r#"{"candidates":[{"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;

    assert_eq!(extract_chunk_text(payload)?, None);
    Ok(())
}

#[test]
fn test_extract_chunk_text_rejects_garbage() {
    let result = extract_chunk_text("not json at all");

    assert!(matches!(result, Err(ChatError::Stream(_))));
}

/// Provider that replies with a fixed set of chunks, for exercising the
/// session history handle without a network.
struct CannedProvider {
    chunks: Vec<&'static str>,
}

#[async_trait::async_trait]
impl ChatProvider for CannedProvider {
    async fn stream_reply(
        &self,
        _system_instruction: &str,
        _history: &[ChatTurn],
    ) -> Result<ChunkReceiver, ChatError> {
        let (tx, rx) = mpsc::channel(8);
        let chunks = self.chunks.clone();
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(Ok(chunk.to_string())).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }
}

#[tokio::test]
async fn test_chat_session_records_history() -> Result<()> {
    let provider = Arc::new(CannedProvider {
        chunks: vec!["Tell me about ", "yourself."],
    });
    let mut session = ChatSession::open(provider, "You are an interviewer.");

    let mut chunks = session.send("Hi, I'm ready.").await?;
    let mut reply = String::new();
    while let Some(chunk) = chunks.recv().await {
        reply.push_str(&chunk.expect("chunk"));
    }
    session.commit_reply(reply.clone());

    assert_eq!(reply, "Tell me about yourself.");
    // Verify: one user turn then one model turn
    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].text, "Hi, I'm ready.");
    assert_eq!(history[1].role, Role::Model);
    assert_eq!(history[1].text, "Tell me about yourself.");

    Ok(())
}
