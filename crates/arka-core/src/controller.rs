//! Chat widget controller
//!
//! Turns a submission into one user message plus one pending placeholder,
//! runs the exchange with the chat endpoint, and writes the outcome back into
//! the placeholder. The frontend supplies the input field and the transcript
//! container as handles; the controller never looks them up itself.
//!
//! Sends are not gated. Several exchanges may be in flight at once and they
//! resolve in whatever order their replies arrive.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::client::ChatClient;
use crate::markup::markdown_to_html;
use crate::state::{Body, ChatMessage, MessageId, Outcome, Transcript, TranscriptError};

/// Text input the user types into
pub trait InputField {
    fn value(&self) -> &str;
    fn clear(&mut self);
}

/// Visible container the transcript is drawn into
pub trait TranscriptView {
    fn append(&mut self, id: MessageId, message: &ChatMessage);
    /// Content changed in place; layout position is unchanged
    fn update(&mut self, id: MessageId, message: &ChatMessage);
    fn scroll_to_end(&mut self);
}

/// What asked for a send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    Enter,
}

/// A submission whose reply has not arrived yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub placeholder: MessageId,
    pub text: String,
}

/// Final content for a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub placeholder: MessageId,
    pub body: Body,
    pub outcome: Outcome,
}

/// Runs exchanges. Cheap to clone into spawned tasks.
#[derive(Clone)]
pub struct Exchanger {
    client: ChatClient,
    error_message: Arc<str>,
}

impl Exchanger {
    pub fn new(client: ChatClient, error_message: &str) -> Self {
        Self {
            client,
            error_message: Arc::from(error_message),
        }
    }

    /// Send the text and build the placeholder's final content. Failures are
    /// logged and turned into the fixed error message; nothing escapes.
    pub async fn exchange(&self, pending: PendingExchange) -> Resolution {
        let PendingExchange { placeholder, text } = pending;

        match self.client.send(&text).await {
            Ok(markdown) => {
                info!(%placeholder, bytes = markdown.len(), "chat reply received");
                let html = markdown_to_html(&markdown);
                Resolution {
                    placeholder,
                    body: Body::Markup { markdown, html },
                    outcome: Outcome::Success,
                }
            }
            Err(err) => {
                error!(
                    %placeholder,
                    endpoint = self.client.endpoint(),
                    error = %err,
                    "chat exchange failed"
                );
                Resolution {
                    placeholder,
                    body: Body::Plain(self.error_message.to_string()),
                    outcome: Outcome::Error,
                }
            }
        }
    }
}

pub struct ChatController {
    transcript: Transcript,
    exchanger: Exchanger,
}

impl ChatController {
    pub fn new(client: ChatClient, error_message: &str) -> Self {
        Self {
            transcript: Transcript::new(),
            exchanger: Exchanger::new(client, error_message),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn exchanger(&self) -> Exchanger {
        self.exchanger.clone()
    }

    pub fn on_trigger<I, V>(
        &mut self,
        trigger: Trigger,
        input: &mut I,
        view: &mut V,
    ) -> Option<PendingExchange>
    where
        I: InputField,
        V: TranscriptView,
    {
        debug!(?trigger, "send triggered");
        self.submit(input, view)
    }

    /// Append the user's message and a placeholder. Whitespace-only input
    /// does nothing.
    pub fn submit<I, V>(&mut self, input: &mut I, view: &mut V) -> Option<PendingExchange>
    where
        I: InputField,
        V: TranscriptView,
    {
        let text = input.value().trim().to_string();
        if text.is_empty() {
            return None;
        }

        let user = ChatMessage::user(text.clone());
        let user_id = self.transcript.push(user.clone());
        self.show(view, user_id, &user);

        input.clear();

        let placeholder = ChatMessage::placeholder();
        let placeholder_id = self.transcript.push(placeholder.clone());
        self.show(view, placeholder_id, &placeholder);

        Some(PendingExchange {
            placeholder: placeholder_id,
            text,
        })
    }

    /// Write an exchange result into its placeholder
    pub fn resolve<V: TranscriptView>(
        &mut self,
        resolution: Resolution,
        view: &mut V,
    ) -> Result<(), TranscriptError> {
        let Resolution { placeholder, body, outcome } = resolution;
        let message = self.transcript.resolve(placeholder, body, outcome)?;
        view.update(placeholder, message);
        Ok(())
    }

    fn show<V: TranscriptView>(&self, view: &mut V, id: MessageId, message: &ChatMessage) {
        view.append(id, message);
        view.scroll_to_end();
    }
}
