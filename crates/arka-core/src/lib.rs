pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod markup;
pub mod state;

// Re-export main types for convenience
pub use client::ChatClient;
pub use config::Config;
pub use controller::{
    ChatController, Exchanger, InputField, PendingExchange, Resolution, TranscriptView, Trigger,
};
pub use error::ExchangeError;
pub use markup::{markdown_options, markdown_to_html};
pub use state::{Body, ChatMessage, ChatRole, ExchangeState, MessageId, Outcome, Transcript};
