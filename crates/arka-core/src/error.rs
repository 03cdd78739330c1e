use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong during one exchange with the chat endpoint.
///
/// The variants exist for the log line only: every one of them collapses to
/// the same message in the transcript.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("chat endpoint answered with status {0}")]
    Status(StatusCode),
    #[error("request to chat endpoint failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("could not decode chat reply: {0}")]
    Decode(#[source] serde_json::Error),
}
