//! UI-agnostic transcript types
//!
//! This module contains the chat transcript shared by every frontend. It
//! doesn't depend on any specific UI framework.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text shown in an assistant message while its exchange is in flight
pub const PLACEHOLDER_TEXT: &str = "...";

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Displayed content of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    Plain(String),
    /// Markdown reply together with its HTML rendering
    Markup { markdown: String, html: String },
}

/// Lifecycle of an assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeState {
    Sent,
    Resolved(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Error,
}

/// A chat message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub body: Body,
    /// Only set on assistant messages
    pub state: Option<ExchangeState>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            body: Body::Plain(text.into()),
            state: None,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            role: ChatRole::Assistant,
            body: Body::Plain(PLACEHOLDER_TEXT.to_string()),
            state: Some(ExchangeState::Sent),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == Some(ExchangeState::Sent)
    }

    pub fn rendered_as_markup(&self) -> bool {
        matches!(self.body, Body::Markup { .. })
    }

    /// What the message displays: HTML for markup, the raw text otherwise
    pub fn content(&self) -> &str {
        match &self.body {
            Body::Plain(text) => text,
            Body::Markup { html, .. } => html,
        }
    }
}

/// Position of a message in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub usize);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("no message with id {0}")]
    UnknownMessage(MessageId),
    #[error("message {0} is not a pending placeholder")]
    NotPending(MessageId),
}

/// Ordered, append-only list of chat messages
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) -> MessageId {
        self.messages.push(message);
        MessageId(self.messages.len() - 1)
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.get(id.0)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    /// Overwrite a pending placeholder. Each placeholder resolves once.
    pub fn resolve(
        &mut self,
        id: MessageId,
        body: Body,
        outcome: Outcome,
    ) -> Result<&ChatMessage, TranscriptError> {
        let message = self
            .messages
            .get_mut(id.0)
            .ok_or(TranscriptError::UnknownMessage(id))?;

        if !message.is_pending() {
            return Err(TranscriptError::NotPending(id));
        }

        message.body = body;
        message.state = Some(ExchangeState::Resolved(outcome));
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_sequential_ids() {
        let mut transcript = Transcript::new();
        let a = transcript.push(ChatMessage::user("hi"));
        let b = transcript.push(ChatMessage::placeholder());
        assert_eq!(a, MessageId(0));
        assert_eq!(b, MessageId(1));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_placeholder_is_pending_plain_text() {
        let msg = ChatMessage::placeholder();
        assert!(msg.is_pending());
        assert!(!msg.rendered_as_markup());
        assert_eq!(msg.content(), "...");
        assert_eq!(msg.role, ChatRole::Assistant);
    }

    #[test]
    fn test_resolve_replaces_body() {
        let mut transcript = Transcript::new();
        let id = transcript.push(ChatMessage::placeholder());
        let body = Body::Markup {
            markdown: "**hi**".to_string(),
            html: "<p><strong>hi</strong></p>\n".to_string(),
        };
        let msg = transcript.resolve(id, body, Outcome::Success).unwrap();
        assert!(msg.rendered_as_markup());
        assert_eq!(msg.state, Some(ExchangeState::Resolved(Outcome::Success)));
        assert_eq!(transcript.pending_count(), 0);
    }

    #[test]
    fn test_resolve_twice_is_rejected() {
        let mut transcript = Transcript::new();
        let id = transcript.push(ChatMessage::placeholder());
        transcript
            .resolve(id, Body::Plain("oops".into()), Outcome::Error)
            .unwrap();
        let err = transcript
            .resolve(id, Body::Plain("again".into()), Outcome::Error)
            .unwrap_err();
        assert_eq!(err, TranscriptError::NotPending(id));
        assert_eq!(transcript.get(id).unwrap().content(), "oops");
    }

    #[test]
    fn test_resolve_user_message_is_rejected() {
        let mut transcript = Transcript::new();
        let id = transcript.push(ChatMessage::user("hello"));
        let err = transcript
            .resolve(id, Body::Plain("x".into()), Outcome::Success)
            .unwrap_err();
        assert_eq!(err, TranscriptError::NotPending(id));
    }

    #[test]
    fn test_resolve_unknown_id() {
        let mut transcript = Transcript::new();
        let err = transcript
            .resolve(MessageId(3), Body::Plain("x".into()), Outcome::Success)
            .unwrap_err();
        assert_eq!(err, TranscriptError::UnknownMessage(MessageId(3)));
    }
}
