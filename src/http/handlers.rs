use super::state::AppState;
use crate::error::SessionError;
use crate::session::{InterviewSession, SessionConfig, SessionStats};
use crate::transcript::Message;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    /// Optional interview ID (if not provided, generate UUID)
    pub interview_id: Option<String>,

    /// Optional candidate name, woven into the system instruction
    pub candidate_name: Option<String>,

    /// Optional position being interviewed for
    pub position: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub interview_id: String,
    pub status: String,
    pub greeting: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub interview_id: String,
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct StopInterviewResponse {
    pub interview_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn session_error_status(error: &SessionError) -> StatusCode {
    match error {
        SessionError::Camera(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SessionError::SessionInit(_) | SessionError::Message(_) => StatusCode::BAD_GATEWAY,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /interviews/start
/// Start a new interview session
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> impl IntoResponse {
    let interview_id = req
        .interview_id
        .unwrap_or_else(|| format!("interview-{}", uuid::Uuid::new_v4()));

    info!("Starting interview: {}", interview_id);

    // Check if an interview with this ID is already running
    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&interview_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Interview {} is already running", interview_id),
                }),
            )
                .into_response();
        }
    }

    let config = SessionConfig {
        session_id: interview_id.clone(),
        candidate_name: req.candidate_name,
        position: req.position,
        ..state.template.clone()
    };

    let session = Arc::new(InterviewSession::new(config, Arc::clone(&state.provider)));

    // Start: acquire camera, open chat session, stream the greeting
    if let Err(e) = session.start().await {
        error!("Failed to start interview {}: {}", interview_id, e);
        return (
            session_error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    let greeting = session
        .transcript()
        .await
        .first()
        .map(|m| m.text.clone())
        .unwrap_or_default();

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(interview_id.clone(), session);
    }

    info!("Interview started: {}", interview_id);

    (
        StatusCode::OK,
        Json(StartInterviewResponse {
            interview_id,
            status: "active".to_string(),
            greeting,
        }),
    )
        .into_response()
}

/// POST /interviews/:interview_id/message
/// Send candidate text and return the interviewer's completed reply
pub async fn send_message(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "message text is empty".to_string(),
            }),
        )
            .into_response();
    }

    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&interview_id).cloned()
    };

    let Some(session) = session else {
        return not_found(&interview_id);
    };

    match session.send_message(&req.text).await {
        Ok(Some(reply)) => (
            StatusCode::OK,
            Json(SendMessageResponse {
                interview_id,
                reply,
            }),
        )
            .into_response(),
        // No-op: a reply is already in flight or the session is not active
        Ok(None) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Interview {} cannot accept a message right now", interview_id),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Message failed for {}: {}", interview_id, e);
            (
                session_error_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /interviews/:interview_id/stop
/// Stop an interview and release its camera
pub async fn stop_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> impl IntoResponse {
    info!("Stopping interview: {}", interview_id);

    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&interview_id)
    };

    match session {
        Some(session) => match session.stop().await {
            Ok(stats) => (
                StatusCode::OK,
                Json(StopInterviewResponse {
                    interview_id,
                    status: "stopped".to_string(),
                    stats,
                }),
            )
                .into_response(),
            Err(e) => {
                error!("Failed to stop interview {}: {}", interview_id, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!("Failed to stop interview: {}", e),
                    }),
                )
                    .into_response()
            }
        },
        None => not_found(&interview_id),
    }
}

/// GET /interviews/:interview_id/status
/// Get a state snapshot of an interview session
pub async fn get_interview_status(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&interview_id) {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => not_found(&interview_id),
    }
}

/// GET /interviews/:interview_id/transcript
/// Get the transcript accumulated so far (partial reply text included)
pub async fn get_interview_transcript(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&interview_id) {
        Some(session) => {
            let transcript: Vec<Message> = session.transcript().await;
            (StatusCode::OK, Json(transcript)).into_response()
        }
        None => not_found(&interview_id),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn not_found(interview_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Interview {} not found", interview_id),
        }),
    )
        .into_response()
}
