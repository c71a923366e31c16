//! Error types for PostHog delivery.
//!
//! These never escape the public tracking calls; they exist so the
//! transport and scheduler layers can use `?` and the callers can log
//! one warning per dropped event.

/// Errors that can occur while scheduling or delivering an event.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Capture endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The scheduler refused to enqueue the call.
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}
