//! Gemini REST adapter.
//!
//! `generateContent` serves one-shot completions. Chat replies use
//! `streamGenerateContent?alt=sse`; the SSE body is read line by line in a
//! spawned task that forwards each text fragment into the reply channel.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};

use super::{ChatBackend, ChatHandle, StreamEvent, StreamHandle, TextCompletion};
use crate::config::CHAT_STREAM_BUFFER;
use crate::error_handling::LlmError;
use crate::models::{ChatMessage, ChatRole};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: ChatRole,
    parts: [PartRef<'a>; 1],
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: [PartRef<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PartRef<'a> {
    text: &'a str,
}

impl<'a> From<&'a ChatMessage> for Content<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Content {
            role: message.role,
            parts: [PartRef {
                text: &message.content,
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Shared connection settings of the client and its chats.
#[derive(Debug, Clone)]
struct Endpoint {
    client: Arc<reqwest::Client>,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl Endpoint {
    async fn post(&self, method: &str, request: &GenerateRequest<'_>) -> Result<reqwest::Response, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/models/{}:{}", self.base_url.trim_end_matches('/'), self.model, method);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Gemini-backed [`TextCompletion`] and [`ChatBackend`].
pub struct GeminiClient {
    endpoint: Endpoint,
}

impl GeminiClient {
    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            endpoint: Endpoint {
                client,
                base_url: base_url.into(),
                model: model.into(),
                api_key,
            },
        }
    }
}

#[async_trait]
impl TextCompletion for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let message = ChatMessage::user(prompt);
        let request = GenerateRequest {
            contents: vec![Content::from(&message)],
            system_instruction: None,
        };

        let response = self.endpoint.post("generateContent", &request).await?;
        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn create_session(
        &self,
        system_instruction: &str,
        history: Vec<ChatMessage>,
    ) -> Result<Arc<dyn ChatHandle>, LlmError> {
        if self.endpoint.api_key.is_none() {
            return Err(LlmError::MissingApiKey);
        }
        Ok(Arc::new(GeminiChat {
            endpoint: self.endpoint.clone(),
            system_instruction: system_instruction.to_string(),
            history: Arc::new(Mutex::new(history)),
        }))
    }
}

/// A Gemini chat. History grows by one user and one model turn per
/// completed exchange; failed exchanges leave it untouched.
pub struct GeminiChat {
    endpoint: Endpoint,
    system_instruction: String,
    history: Arc<Mutex<Vec<ChatMessage>>>,
}

impl GeminiChat {
    /// Copy of the turns the next request will carry.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }
}

/// Extracts the JSON payload of an SSE `data:` line.
fn sse_data(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim).filter(|d| !d.is_empty())
}

/// Splits a byte stream into lines. Bytes are held until their line is
/// complete, so a UTF-8 sequence cut across chunks decodes intact.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    /// Appends a chunk and returns the lines it completed.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.bytes.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(end) = self.bytes.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.bytes.drain(..=end).collect();
            lines.push(String::from_utf8_lossy(&line).trim_end().to_string());
        }
        lines
    }

    /// The unterminated remainder at end of stream.
    fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.bytes).trim().to_string();
        (!rest.is_empty()).then_some(rest)
    }
}

/// What one SSE line contributed to the reply.
#[derive(Debug, PartialEq)]
enum StreamChunk {
    Text(String),
    Failed(String),
}

fn parse_stream_line(line: &str) -> Option<StreamChunk> {
    let data = sse_data(line)?;
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(data) {
        return Some(StreamChunk::Failed(envelope.error.message));
    }
    match serde_json::from_str::<GenerateResponse>(data) {
        Ok(event) => {
            let fragment = event.text();
            (!fragment.is_empty()).then_some(StreamChunk::Text(fragment))
        }
        Err(e) => {
            log::debug!("Skipping unparseable stream event: {}", e);
            None
        }
    }
}

#[async_trait]
impl ChatHandle for GeminiChat {
    async fn send_message_stream(&self, text: &str) -> Result<StreamHandle, LlmError> {
        let user_turn = ChatMessage::user(text);
        let response = {
            let history = self.history.lock().await;
            let request = GenerateRequest {
                contents: history
                    .iter()
                    .chain(std::iter::once(&user_turn))
                    .map(Content::from)
                    .collect(),
                system_instruction: Some(SystemInstruction {
                    parts: [PartRef {
                        text: &self.system_instruction,
                    }],
                }),
            };
            self.endpoint
                .post("streamGenerateContent?alt=sse", &request)
                .await?
        };

        let (tx, rx) = mpsc::channel(CHAT_STREAM_BUFFER);
        let history = Arc::clone(&self.history);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut lines = LineBuffer::default();
            let mut full_text = String::new();
            let mut done = false;

            while !done {
                let completed = match stream.next().await {
                    Some(Ok(chunk)) => lines.push(&chunk),
                    Some(Err(e)) => {
                        log::warn!("Chat stream broke off: {}", e);
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                    None => {
                        done = true;
                        // A final event without a trailing newline
                        std::mem::take(&mut lines).finish().into_iter().collect()
                    }
                };

                for line in completed {
                    match parse_stream_line(&line) {
                        Some(StreamChunk::Text(fragment)) => {
                            full_text.push_str(&fragment);
                            if tx.send(StreamEvent::Delta(fragment)).await.is_err() {
                                // Receiver dropped; the exchange is abandoned
                                return;
                            }
                        }
                        Some(StreamChunk::Failed(message)) => {
                            log::warn!("Chat stream reported an error: {}", message);
                            let _ = tx.send(StreamEvent::Error(message)).await;
                            return;
                        }
                        None => {}
                    }
                }
            }

            {
                let mut history = history.lock().await;
                history.push(user_turn);
                history.push(ChatMessage::model(full_text));
            }
            let _ = tx.send(StreamEvent::Completed).await;
        });

        Ok(StreamHandle::new(rx))
    }
}
