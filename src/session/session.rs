use super::config::SessionConfig;
use super::stats::{SessionState, SessionStats};
use crate::camera::{CameraBackend, CameraBackendFactory};
use crate::chat::{ChatError, ChatProvider, ChatSession};
use crate::error::SessionError;
use crate::transcript::{Message, Speaker, Transcript};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Lifecycle state plus the most recent failure description
#[derive(Debug)]
struct StateSlot {
    state: SessionState,
    error: Option<String>,
}

/// One simulated video interview: owns the camera capture, the chat
/// session with the interviewer model, and the transcript.
///
/// At most one camera handle and one chat session are live at a time, and
/// the camera is released on every exit path (init failure, explicit stop,
/// drop of the last reference). A single busy flag serializes sends; there
/// is no other lock discipline because there is only one writer.
pub struct InterviewSession {
    /// Session configuration
    config: SessionConfig,

    /// Chat provider shared across sessions
    provider: Arc<dyn ChatProvider>,

    /// When the session was created
    started_at: chrono::DateTime<chrono::Utc>,

    /// Lifecycle state + last error description
    state: Arc<Mutex<StateSlot>>,

    /// Ordered conversation record
    transcript: Arc<Mutex<Transcript>>,

    /// Live chat session, present only while active
    chat: Arc<Mutex<Option<ChatSession>>>,

    /// Live camera backend, present only while capture runs
    camera: Arc<Mutex<Option<Box<dyn CameraBackend>>>>,

    /// Set while a streamed reply is in flight
    reply_pending: Arc<AtomicBool>,

    /// Frames drained from the camera so far
    frames_captured: Arc<AtomicUsize>,

    /// Handle for the frame-drain task
    frame_task_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl InterviewSession {
    pub fn new(config: SessionConfig, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            config,
            provider,
            started_at: Utc::now(),
            state: Arc::new(Mutex::new(StateSlot {
                state: SessionState::Idle,
                error: None,
            })),
            transcript: Arc::new(Mutex::new(Transcript::new())),
            chat: Arc::new(Mutex::new(None)),
            camera: Arc::new(Mutex::new(None)),
            reply_pending: Arc::new(AtomicBool::new(false)),
            frames_captured: Arc::new(AtomicUsize::new(0)),
            frame_task_handle: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    /// Start the interview: acquire the camera, open the chat session, and
    /// stream the interviewer's greeting into the transcript.
    pub async fn start(&self) -> Result<(), SessionError> {
        {
            let mut slot = self.state.lock().await;
            if matches!(
                slot.state,
                SessionState::Active | SessionState::Initializing
            ) {
                warn!("Interview {} already started", self.config.session_id);
                return Ok(());
            }
            slot.state = SessionState::Initializing;
            slot.error = None;
        }

        info!("Starting interview session: {}", self.config.session_id);

        // Camera first; if this fails no chat session is ever created.
        let mut backend = match CameraBackendFactory::create(
            self.config.camera_source.clone(),
            self.config.camera.clone(),
        ) {
            Ok(backend) => backend,
            Err(e) => return self.fail_camera(e.to_string()).await,
        };

        let mut frames = match backend.start().await {
            Ok(rx) => rx,
            Err(e) => return self.fail_camera(e.to_string()).await,
        };

        {
            let mut camera = self.camera.lock().await;
            *camera = Some(backend);
        }

        // Drain frames while capture is live so the channel never backs up.
        let frames_captured = Arc::clone(&self.frames_captured);
        let frame_task = tokio::spawn(async move {
            info!("Camera frame task started");
            while frames.recv().await.is_some() {
                frames_captured.fetch_add(1, Ordering::SeqCst);
            }
            info!("Camera frame task stopped");
        });

        {
            let mut handle = self.frame_task_handle.lock().await;
            *handle = Some(frame_task);
        }

        // Open the chat session and stream the greeting.
        let mut chat = ChatSession::open(
            Arc::clone(&self.provider),
            self.config.effective_system_instruction(),
        );

        match self
            .stream_into_transcript(&mut chat, &self.config.greeting_prompt)
            .await
        {
            Ok(_) => {
                {
                    let mut slot = self.chat.lock().await;
                    *slot = Some(chat);
                }
                let mut slot = self.state.lock().await;
                slot.state = SessionState::Active;
                info!("Interview session active: {}", self.config.session_id);
                Ok(())
            }
            Err(e) => {
                // The chat session never opened; release the camera and
                // return to idle so the client may retry from scratch.
                self.release_camera().await;
                {
                    let mut slot = self.state.lock().await;
                    slot.state = SessionState::Idle;
                    slot.error = Some(e.to_string());
                }
                error!(
                    "Failed to open chat session for {}: {}",
                    self.config.session_id, e
                );
                Err(SessionError::SessionInit(e.to_string()))
            }
        }
    }

    /// Send a candidate message and stream the interviewer's reply.
    ///
    /// Returns `Ok(None)` without touching the transcript when the input
    /// is blank, a reply is already in flight, or the session is not
    /// active. On failure the partial reply is rolled back and only the
    /// candidate's message remains.
    pub async fn send_message(&self, text: &str) -> Result<Option<String>, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        {
            let slot = self.state.lock().await;
            if slot.state != SessionState::Active {
                warn!(
                    "Dropping message for {}: session not active",
                    self.config.session_id
                );
                return Ok(None);
            }
        }

        if self
            .reply_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(
                "Dropping message for {}: reply already in flight",
                self.config.session_id
            );
            return Ok(None);
        }

        let result = self.send_inner(text).await;
        self.reply_pending.store(false, Ordering::SeqCst);

        if let Err(e) = &result {
            let mut slot = self.state.lock().await;
            slot.error = Some(e.to_string());
        }

        result.map(Some)
    }

    async fn send_inner(&self, text: &str) -> Result<String, SessionError> {
        {
            let mut transcript = self.transcript.lock().await;
            transcript.push(Speaker::User, text);
        }

        let mut chat_guard = self.chat.lock().await;
        let chat = chat_guard
            .as_mut()
            .ok_or_else(|| SessionError::Message("no live chat session".to_string()))?;

        match self.stream_into_transcript(chat, text).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                error!(
                    "Reply failed for {}; partial text discarded: {}",
                    self.config.session_id, e
                );
                Err(SessionError::Message(e.to_string()))
            }
        }
    }

    /// Stream one reply into a fresh assistant transcript entry.
    ///
    /// The entry grows chunk-by-chunk so concurrent transcript reads see
    /// the reply as it arrives. On any failure the entry is removed and
    /// nothing else in the transcript changes.
    async fn stream_into_transcript(
        &self,
        chat: &mut ChatSession,
        prompt: &str,
    ) -> Result<String, ChatError> {
        let mut chunks = chat.send(prompt).await?;

        {
            let mut transcript = self.transcript.lock().await;
            transcript.push(Speaker::Assistant, "");
        }

        let mut reply = String::new();
        while let Some(chunk) = chunks.recv().await {
            match chunk {
                Ok(text) => {
                    reply.push_str(&text);
                    let mut transcript = self.transcript.lock().await;
                    transcript.amend_last(&text);
                }
                Err(e) => {
                    let mut transcript = self.transcript.lock().await;
                    transcript.rollback_last();
                    return Err(e);
                }
            }
        }

        chat.commit_reply(reply.clone());
        Ok(reply)
    }

    async fn fail_camera(&self, desc: String) -> Result<(), SessionError> {
        {
            let mut slot = self.state.lock().await;
            slot.state = SessionState::Error;
            slot.error = Some(desc.clone());
        }
        error!(
            "Camera unavailable for {}: {}",
            self.config.session_id, desc
        );
        Err(SessionError::Camera(desc))
    }

    async fn release_camera(&self) {
        let mut camera = self.camera.lock().await;
        if let Some(mut backend) = camera.take() {
            if let Err(e) = backend.stop().await {
                error!("Failed to stop camera backend: {}", e);
            }
        }
    }

    /// End the interview and release the camera
    pub async fn stop(&self) -> anyhow::Result<SessionStats> {
        info!("Stopping interview session: {}", self.config.session_id);

        self.release_camera().await;

        // The frame task ends once the capture side of the channel drops.
        {
            let mut handle = self.frame_task_handle.lock().await;
            if let Some(task) = handle.take() {
                if let Err(e) = task.await {
                    error!("Frame task panicked: {}", e);
                }
            }
        }

        {
            let mut chat = self.chat.lock().await;
            *chat = None;
        }

        {
            let mut slot = self.state.lock().await;
            slot.state = SessionState::Idle;
        }

        info!("Interview session stopped: {}", self.config.session_id);

        Ok(self.stats().await)
    }

    /// Whether the camera resource is currently held
    pub async fn is_camera_live(&self) -> bool {
        self.camera.lock().await.is_some()
    }

    /// Current state snapshot
    pub async fn stats(&self) -> SessionStats {
        let (state, error) = {
            let slot = self.state.lock().await;
            (slot.state, slot.error.clone())
        };
        let messages = self.transcript.lock().await.len();
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            state,
            error,
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            messages,
            frames_captured: self.frames_captured.load(Ordering::SeqCst),
            reply_pending: self.reply_pending.load(Ordering::SeqCst),
        }
    }

    /// Ordered transcript snapshot (includes partial reply text while a
    /// send is in flight)
    pub async fn transcript(&self) -> Vec<Message> {
        self.transcript.lock().await.snapshot()
    }
}
