//! HTTP transport used by the API client

use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("The API did not send a properly formatted response: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Sends a JSON body and returns the raw response body.
///
/// Non-2xx statuses are not errors here: the API reports failures inside
/// the response envelope.
pub trait Transport {
    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, NetworkError>;
}

/// Blocking reqwest transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("openblu-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, NetworkError> {
        debug!("POST {}", url);

        let response = self.client.post(url).json(body).send()?;
        let status = response.status();
        let text = response.text()?;
        debug!("Response status {} ({} bytes)", status, text.len());

        Ok(text)
    }
}
