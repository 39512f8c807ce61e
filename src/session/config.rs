use crate::camera::{CameraBackendConfig, CameraSource};
use serde::{Deserialize, Serialize};

/// System instruction used when the caller does not supply one
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a professional job interviewer \
conducting a video interview. Ask one question at a time, keep questions concise, \
listen to the candidate's answers, and follow up naturally. Stay in character for \
the whole interview.";

/// Hidden prompt that elicits the interviewer's opening message. It lives
/// only in provider history, never in the transcript.
pub const GREETING_PROMPT: &str =
    "Please greet the candidate and ask your first interview question.";

/// Configuration for an interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "interview-2026-08-30-backend")
    pub session_id: String,

    /// Candidate name, woven into the system instruction when present
    pub candidate_name: Option<String>,

    /// Position being interviewed for, woven into the system instruction
    pub position: Option<String>,

    /// Which camera to capture from
    pub camera_source: CameraSource,

    /// Capture parameters
    pub camera: CameraBackendConfig,

    /// Fixed system instruction for the interviewer model
    pub system_instruction: String,

    /// Prompt used to elicit the opening greeting
    pub greeting_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            candidate_name: None,
            position: None,
            camera_source: CameraSource::Device(0),
            camera: CameraBackendConfig::default(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            greeting_prompt: GREETING_PROMPT.to_string(),
        }
    }
}

impl SessionConfig {
    /// System instruction with candidate/position context appended
    pub fn effective_system_instruction(&self) -> String {
        let mut instruction = self.system_instruction.clone();
        if let Some(name) = &self.candidate_name {
            instruction.push_str(&format!(" The candidate's name is {name}."));
        }
        if let Some(position) = &self.position {
            instruction.push_str(&format!(
                " The interview is for the position of {position}."
            ));
        }
        instruction
    }
}
