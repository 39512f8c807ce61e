use super::provider::{ChatError, ChatProvider, ChatTurn, ChunkReceiver};
use crate::config::ChatConfig;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Gemini-style streaming chat provider.
///
/// Talks to `{api_base}/models/{model}:streamGenerateContent?alt=sse` and
/// parses the reply incrementally from the SSE byte stream. The API key is
/// read from the process environment at startup and never appears in config
/// files or logs.
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a provider from config, resolving the credential from the
    /// environment variable the config names.
    pub fn from_env(config: &ChatConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ChatError::MissingCredential(config.api_key_env.clone()))?;

        Ok(Self::new(
            config.api_base.clone(),
            config.model.clone(),
            api_key,
        ))
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateChunk {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ============================================================================
// SSE parsing
// ============================================================================

/// Incremental line splitter for SSE byte streams. Network chunks do not
/// respect line boundaries, so bytes are buffered until a full line arrives.
#[derive(Debug, Default)]
pub struct SseLines {
    buf: Vec<u8>,
}

impl SseLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete line, if one is buffered
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).trim_end().to_string())
    }
}

/// Extract the payload of an SSE `data:` line; `None` for blank lines,
/// comments, and other fields.
pub fn sse_data(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Pull the reply text out of one streamed chunk payload. `Ok(None)` for
/// chunks that carry no text (safety metadata, usage counts).
pub fn extract_chunk_text(data: &str) -> Result<Option<String>, ChatError> {
    let chunk: GenerateChunk = serde_json::from_str(data)
        .map_err(|e| ChatError::Stream(format!("unreadable stream payload: {e}")))?;

    let text: String = chunk
        .candidates
        .into_iter()
        .flatten()
        .filter_map(|c| c.content)
        .filter_map(|c| c.parts)
        .flatten()
        .filter_map(|p| p.text)
        .collect();

    Ok(if text.is_empty() { None } else { Some(text) })
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[ChatTurn],
    ) -> Result<ChunkReceiver, ChatError> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: "user",
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            contents: history
                .iter()
                .map(|turn| Content {
                    role: turn.role.as_wire(),
                    parts: vec![Part { text: &turn.text }],
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ChatError::Api { status, message });
        }

        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut lines = SseLines::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Reply stream broke mid-flight: {}", e);
                        let _ = tx.send(Err(ChatError::Stream(e.to_string()))).await;
                        return;
                    }
                };

                lines.push(&bytes);
                while let Some(line) = lines.next_line() {
                    let Some(data) = sse_data(&line) else {
                        continue;
                    };
                    match extract_chunk_text(data) {
                        Ok(Some(text)) => {
                            debug!("Received {} reply bytes", text.len());
                            if tx.send(Ok(text)).await.is_err() {
                                return; // consumer gone
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }
                }
            }
            // Stream ended cleanly; dropping tx terminates the reply.
        });

        Ok(rx)
    }
}
