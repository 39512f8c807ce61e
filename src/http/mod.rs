//! HTTP API server for driving interviews
//!
//! This module provides a REST API for controlling interview sessions:
//! - POST /interviews/start - Start a new interview
//! - POST /interviews/:id/message - Send candidate text, get the reply
//! - POST /interviews/:id/stop - Stop an interview
//! - GET /interviews/:id/status - Query session state
//! - GET /interviews/:id/transcript - Get the transcript so far
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
