use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ExchangeError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post one message and return the Markdown reply.
    pub async fn send(&self, message: &str) -> Result<String, ExchangeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(ExchangeError::Transport)?;

        // Non-2xx is a failure whatever the body says
        if !response.status().is_success() {
            return Err(ExchangeError::Status(response.status()));
        }

        let bytes = response.bytes().await.map_err(ExchangeError::Transport)?;
        let reply: ChatReply = serde_json::from_slice(&bytes).map_err(ExchangeError::Decode)?;
        Ok(reply.response)
    }
}
