//! HTTP transport for the PostHog capture endpoint.

use crate::types::CapturePayload;
use crate::Error;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// Path of the single-event capture endpoint.
pub const CAPTURE_PATH: &str = "/i/v0/e/";

/// Build the capture URL for `host`.
pub fn capture_url(host: &str) -> String {
    format!("{}{}", host.trim_end_matches('/'), CAPTURE_PATH)
}

/// HTTP transport posting single events to PostHog.
///
/// Uses the reqwest client defaults; no timeout is configured.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a new HTTP transport for `host`.
    pub fn new(host: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            endpoint: capture_url(host),
        })
    }

    /// The capture URL this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post a payload to the capture endpoint.
    pub async fn send(&self, payload: &CapturePayload) -> Result<(), Error> {
        debug!(endpoint = %self.endpoint, event = %payload.event, "capturing event");

        let body = serde_json::to_vec(payload)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".into());
            return Err(Error::Status { status, body });
        }

        debug!(status = %status, "event captured");
        Ok(())
    }
}
