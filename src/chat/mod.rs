//! Conversation session over one analysis.
//!
//! A session is bound to the analysis snapshot it was created from. Its turn
//! list starts with the two priming turns handed to the chat backend, then the
//! greeting, and grows by exactly one user turn and one model turn per message.
//! The model turn is appended empty and filled as fragments arrive.
//!
//! The session is plain state; the orchestrator drives the stream and calls
//! [`ConversationSession::apply_fragment`], [`ConversationSession::complete`],
//! or [`ConversationSession::fail`] as events arrive.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{ASSISTANT_NAME, OUT_OF_SCOPE_REPLY};
use crate::error_handling::{ChatError, LlmError};
use crate::llm::{ChatBackend, ChatHandle};
use crate::models::{ChatMessage, ChatRole, MetaData, PsiData, ServerDetails};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Idle; a message may be sent
    Ready,
    /// A reply is streaming into the last turn
    AwaitingResponse,
    /// Superseded by a newer analysis; turns are gone
    Closed,
}

/// Analysis context embedded in the priming turn.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisContext<'a> {
    url: &'a str,
    meta_data: &'a MetaData,
    server_details: &'a ServerDetails,
    psi_data: Option<&'a PsiData>,
}

/// System instruction scoping the assistant to `url`.
pub fn system_instruction(url: &str) -> String {
    format!(
        "You are '{ASSISTANT_NAME}', an expert SEO and web design assistant. You are analyzing the domain: {url}.\n\
         All your answers must strictly relate to this domain, its SEO, its performance, its content, or potential design improvements.\n\
         You have the full analysis context available to you. Some data may be missing if it failed to load; acknowledge this if relevant to the user's question.\n\
         If the user asks a question unrelated to this context (e.g., 'what is the capital of France?', 'write a poem'), you MUST respond with EXACTLY this text and nothing more: '{OUT_OF_SCOPE_REPLY}'\n\
         Keep your answers concise and helpful. Use markdown for formatting when appropriate."
    )
}

/// The two synthetic turns that hand the analysis to the model.
pub fn priming_history(
    url: &str,
    meta_data: &MetaData,
    server_details: &ServerDetails,
    psi_data: Option<&PsiData>,
) -> Vec<ChatMessage> {
    let context = AnalysisContext {
        url,
        meta_data,
        server_details,
        psi_data,
    };
    let context_json = serde_json::to_string(&context).unwrap_or_else(|e| {
        log::warn!("Could not serialize analysis context for {}: {}", url, e);
        String::from("{}")
    });

    vec![
        ChatMessage::user(format!(
            "Here is the full SEO and performance analysis for my site {url}. Please use this as context for all my future questions: {context_json}"
        )),
        ChatMessage::model(format!(
            "Understood. I have the complete analysis for {url}. I am ready to answer your questions regarding its SEO and design."
        )),
    ]
}

/// First visible assistant turn.
pub fn greeting(url: &str) -> String {
    format!("Hello! I'm ready to help you with your site, {url}. Ask me anything about its SEO or design.")
}

/// Chat state for one analysis run.
#[derive(Clone)]
pub struct ConversationSession {
    url: String,
    handle: Arc<dyn ChatHandle>,
    turns: Vec<ChatMessage>,
    state: SessionState,
}

impl fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSession")
            .field("url", &self.url)
            .field("turns", &self.turns.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ConversationSession {
    /// Opens a chat seeded with the analysis and appends the greeting.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the chat could not be created.
    pub async fn open(
        backend: &dyn ChatBackend,
        url: &str,
        meta_data: &MetaData,
        server_details: &ServerDetails,
        psi_data: Option<&PsiData>,
    ) -> Result<Self, LlmError> {
        let history = priming_history(url, meta_data, server_details, psi_data);
        let handle = backend
            .create_session(&system_instruction(url), history.clone())
            .await?;
        Ok(Self::with_handle(url, handle, history))
    }

    /// Builds a ready session around an existing chat handle.
    pub fn with_handle(url: &str, handle: Arc<dyn ChatHandle>, priming: Vec<ChatMessage>) -> Self {
        let mut turns = priming;
        turns.push(ChatMessage::model(greeting(url)));
        Self {
            url: url.to_string(),
            handle,
            turns,
            state: SessionState::Ready,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every turn so far, in order.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// The handle replies are requested from.
    pub fn handle(&self) -> Arc<dyn ChatHandle> {
        Arc::clone(&self.handle)
    }

    /// Appends the user's turn and an empty model placeholder.
    ///
    /// # Errors
    ///
    /// Fails unless the session is [`SessionState::Ready`] and `text` is non-empty.
    pub fn begin_message(&mut self, text: &str) -> Result<(), ChatError> {
        match self.state {
            SessionState::Ready => {}
            SessionState::AwaitingResponse => return Err(ChatError::Busy),
            SessionState::Closed => return Err(ChatError::Closed),
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.turns.push(ChatMessage::user(text));
        self.turns.push(ChatMessage::model(String::new()));
        self.state = SessionState::AwaitingResponse;
        Ok(())
    }

    fn placeholder(&mut self) -> Option<&mut ChatMessage> {
        if self.state != SessionState::AwaitingResponse {
            return None;
        }
        self.turns.last_mut().filter(|turn| turn.role == ChatRole::Model)
    }

    /// Appends a streamed fragment to the placeholder turn.
    pub fn apply_fragment(&mut self, fragment: &str) {
        if let Some(turn) = self.placeholder() {
            turn.content.push_str(fragment);
        }
    }

    /// Ends the exchange; the placeholder keeps the streamed text.
    pub fn complete(&mut self) {
        if self.state == SessionState::AwaitingResponse {
            self.state = SessionState::Ready;
        }
    }

    /// Ends the exchange, replacing the placeholder's content with `message`.
    pub fn fail(&mut self, message: &str) {
        if let Some(turn) = self.placeholder() {
            turn.content = message.to_string();
        }
        self.complete();
    }

    /// Discards the turns; no further messages are accepted.
    pub fn close(&mut self) {
        self.turns.clear();
        self.state = SessionState::Closed;
    }
}
