// Integration tests for the interview session controller
//
// A scripted chat provider and the synthetic camera backend stand in for
// the hosted model and the real device, so every lifecycle path runs
// without a network or hardware.

use ai_interviewer::camera::CameraSource;
use ai_interviewer::chat::{ChatError, ChatProvider, ChatTurn, ChunkReceiver};
use ai_interviewer::session::{InterviewSession, SessionConfig, SessionState};
use ai_interviewer::transcript::Speaker;
use ai_interviewer::SessionError;
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Scripted chat provider
// ============================================================================

enum Script {
    /// Stream these chunks, then finish cleanly
    Reply(Vec<&'static str>),
    /// Like Reply, but wait before the first chunk (holds the busy flag)
    SlowReply {
        delay_ms: u64,
        chunks: Vec<&'static str>,
    },
    /// Fail before any chunk is produced
    FailOpen,
    /// Stream these chunks, then break mid-reply
    FailMidStream(Vec<&'static str>),
}

struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatProvider for ScriptedProvider {
    async fn stream_reply(
        &self,
        _system_instruction: &str,
        _history: &[ChatTurn],
    ) -> Result<ChunkReceiver, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("provider called more times than scripted");

        match script {
            Script::FailOpen => Err(ChatError::Http("connection refused".to_string())),
            Script::Reply(chunks) => Ok(stream_chunks(chunks, 0, false)),
            Script::SlowReply { delay_ms, chunks } => Ok(stream_chunks(chunks, delay_ms, false)),
            Script::FailMidStream(chunks) => Ok(stream_chunks(chunks, 0, true)),
        }
    }
}

fn stream_chunks(chunks: Vec<&'static str>, delay_ms: u64, fail_after: bool) -> ChunkReceiver {
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        for chunk in chunks {
            if tx.send(Ok(chunk.to_string())).await.is_err() {
                return;
            }
        }
        if fail_after {
            let _ = tx
                .send(Err(ChatError::Stream("connection reset".to_string())))
                .await;
        }
    });
    rx
}

fn test_session(source: CameraSource, provider: Arc<ScriptedProvider>) -> InterviewSession {
    let config = SessionConfig {
        session_id: "interview-test".to_string(),
        camera_source: source,
        ..SessionConfig::default()
    };
    InterviewSession::new(config, provider)
}

// ============================================================================
// Lifecycle tests
// ============================================================================

#[tokio::test]
async fn test_camera_denied_creates_no_chat_session() -> Result<()> {
    let provider = ScriptedProvider::new(vec![]);
    let session = test_session(CameraSource::Denied, Arc::clone(&provider));

    let result = session.start().await;

    assert!(matches!(result, Err(SessionError::Camera(_))));

    // Verify: error state surfaced, no chat session opened, nothing rendered
    let stats = session.stats().await;
    assert_eq!(stats.state, SessionState::Error);
    assert!(stats.error.is_some());
    assert_eq!(provider.calls(), 0, "No chat session should be created");
    assert!(session.transcript().await.is_empty());
    assert!(!session.is_camera_live().await);

    Ok(())
}

#[tokio::test]
async fn test_successful_start_yields_one_greeting() -> Result<()> {
    let provider = ScriptedProvider::new(vec![Script::Reply(vec![
        "Welcome! ",
        "Tell me about yourself.",
    ])]);
    let session = test_session(CameraSource::Test, provider);

    session.start().await?;

    let stats = session.stats().await;
    assert_eq!(stats.state, SessionState::Active);

    // Verify: exactly one assistant message before any user message
    let transcript = session.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].speaker, Speaker::Assistant);
    assert_eq!(transcript[0].text, "Welcome! Tell me about yourself.");

    session.stop().await?;
    Ok(())
}

#[tokio::test]
async fn test_chat_init_failure_releases_camera_and_returns_to_idle() -> Result<()> {
    let provider = ScriptedProvider::new(vec![Script::FailOpen]);
    let session = test_session(CameraSource::Test, provider);

    let result = session.start().await;

    assert!(matches!(result, Err(SessionError::SessionInit(_))));
    let stats = session.stats().await;
    assert_eq!(stats.state, SessionState::Idle);
    assert!(stats.error.is_some());
    assert!(!session.is_camera_live().await, "Camera must be released");
    assert!(session.transcript().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_streamed_chunks_concatenate_into_one_reply() -> Result<()> {
    let provider = ScriptedProvider::new(vec![
        Script::Reply(vec!["Hi."]),
        Script::Reply(vec!["Hel", "lo"]),
    ]);
    let session = test_session(CameraSource::Test, provider);
    session.start().await?;

    let reply = session.send_message("Good morning.").await?;

    assert_eq!(reply.as_deref(), Some("Hello"));

    // Verify: a single assistant entry, no intermediate entries left behind
    let transcript = session.transcript().await;
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].speaker, Speaker::User);
    assert_eq!(transcript[2].speaker, Speaker::Assistant);
    assert_eq!(transcript[2].text, "Hello");

    session.stop().await?;
    Ok(())
}

#[tokio::test]
async fn test_blank_message_is_a_noop() -> Result<()> {
    let provider = ScriptedProvider::new(vec![Script::Reply(vec!["Hi."])]);
    let session = test_session(CameraSource::Test, Arc::clone(&provider));
    session.start().await?;

    let result = session.send_message("   \t  ").await?;

    assert!(result.is_none());
    assert_eq!(session.transcript().await.len(), 1, "Transcript unchanged");
    assert_eq!(provider.calls(), 1, "Only the greeting hit the provider");

    session.stop().await?;
    Ok(())
}

#[tokio::test]
async fn test_send_while_reply_pending_is_a_noop() -> Result<()> {
    let provider = ScriptedProvider::new(vec![
        Script::Reply(vec!["Hi."]),
        Script::SlowReply {
            delay_ms: 200,
            chunks: vec!["Thanks for sharing."],
        },
    ]);
    let session = Arc::new(test_session(CameraSource::Test, Arc::clone(&provider)));
    session.start().await?;

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.send_message("I led the billing rewrite.").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Second send arrives while the first reply is still streaming
    let second = session.send_message("Also I like Rust.").await?;
    assert!(second.is_none(), "Overlapping send must be dropped");

    let first = first.await?.expect("first send should succeed");
    assert_eq!(first.as_deref(), Some("Thanks for sharing."));

    // Verify: only the first exchange made it into the transcript
    let transcript = session.transcript().await;
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].text, "I led the billing rewrite.");
    assert_eq!(provider.calls(), 2);

    session.stop().await?;
    Ok(())
}

#[tokio::test]
async fn test_failed_send_rolls_back_partial_reply() -> Result<()> {
    let provider = ScriptedProvider::new(vec![
        Script::Reply(vec!["Hi."]),
        Script::FailMidStream(vec!["I was about to sa"]),
    ]);
    let session = test_session(CameraSource::Test, provider);
    session.start().await?;

    let before = session.transcript().await;
    let result = session.send_message("What's next?").await;

    assert!(matches!(result, Err(SessionError::Message(_))));

    // Verify: sequence after == sequence before + the one new user message
    let after = session.transcript().await;
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after.last().unwrap().speaker, Speaker::User);
    assert_eq!(after.last().unwrap().text, "What's next?");
    assert!(
        after.iter().all(|m| !m.text.contains("about to sa")),
        "Partial reply text must be discarded"
    );

    session.stop().await?;
    Ok(())
}

#[tokio::test]
async fn test_stop_releases_camera_and_counts_frames() -> Result<()> {
    let provider = ScriptedProvider::new(vec![Script::Reply(vec!["Hi."])]);
    let session = test_session(CameraSource::Test, provider);
    session.start().await?;

    assert!(session.is_camera_live().await);

    // Let the synthetic camera produce a few frames
    tokio::time::sleep(Duration::from_millis(150)).await;

    let stats = session.stop().await?;

    assert_eq!(stats.state, SessionState::Idle);
    assert!(stats.frames_captured >= 1, "Frame task should have run");
    assert!(!session.is_camera_live().await, "Camera must be released");

    Ok(())
}
