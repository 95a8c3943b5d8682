//! Generative-text collaborators.
//!
//! The suggestion generator needs one-shot completions ([`TextCompletion`]);
//! the conversation session needs a stateful chat whose replies arrive as a
//! stream of text fragments ([`ChatBackend`] / [`ChatHandle`]).
//! [`GeminiClient`] implements both over the Gemini REST API.

mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error_handling::LlmError;
use crate::models::ChatMessage;

pub use gemini::{GeminiChat, GeminiClient};

/// One event of a streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment, in receipt order
    Delta(String),
    /// The stream finished
    Completed,
    /// The stream broke off
    Error(String),
}

/// Receiving end of a streamed reply.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event; `None` once the sender is gone.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// One-shot text generation.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Creates chat sessions seeded with a system instruction and prior turns.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn create_session(
        &self,
        system_instruction: &str,
        history: Vec<ChatMessage>,
    ) -> Result<Arc<dyn ChatHandle>, LlmError>;
}

/// An open chat; remembers every completed exchange.
#[async_trait]
pub trait ChatHandle: Send + Sync {
    /// Sends `text` and returns the stream of the reply.
    ///
    /// An `Err` means nothing was sent; failures after the stream opened
    /// arrive as [`StreamEvent::Error`].
    async fn send_message_stream(&self, text: &str) -> Result<StreamHandle, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_next_event_in_send_order_then_none() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("Hel".to_string())).await.unwrap();
        tx.send(StreamEvent::Delta("lo".to_string())).await.unwrap();
        tx.send(StreamEvent::Completed).await.unwrap();
        drop(tx);

        let mut handle = StreamHandle::new(rx);
        assert_eq!(handle.next_event().await, Some(StreamEvent::Delta("Hel".to_string())));
        assert_eq!(handle.next_event().await, Some(StreamEvent::Delta("lo".to_string())));
        assert_eq!(handle.next_event().await, Some(StreamEvent::Completed));
        assert_eq!(handle.next_event().await, None);
    }
}
