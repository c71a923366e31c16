//! The deferred `trackEvent` handler.
//!
//! Runs outside the caller's transaction, builds one capture payload and
//! posts it. Every failure ends in a warning; nothing is returned.

use crate::config::DEFAULT_HOST;
use crate::transport::HttpTransport;
use crate::types::{CapturePayload, TrackEventArgs};
use crate::Error;
use chrono::{SecondsFormat, Utc};
use tracing::warn;

/// Current time as RFC 3339 UTC with millisecond precision.
pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Deliver one event to PostHog.
///
/// An empty API key is a silent no-op. Missing `user_id` or `event`
/// drops the event with a warning. Delivery and transport failures are
/// logged and swallowed.
pub async fn track_event(args: TrackEventArgs) {
    if args.api_key.is_empty() {
        return;
    }

    if args.user_id.is_empty() || args.event.is_empty() {
        warn!(
            user_id = %args.user_id,
            event = %args.event,
            "PostHog: userId and event are required"
        );
        return;
    }

    let host = args
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .unwrap_or(DEFAULT_HOST);

    let transport = match HttpTransport::new(host) {
        Ok(transport) => transport,
        Err(e) => {
            warn!(error = %e, "PostHog tracking failed");
            return;
        }
    };

    // Stamped at send time, not schedule time
    let payload = CapturePayload::from_args(&args, now_iso8601());

    match transport.send(&payload).await {
        Ok(()) => {}
        Err(Error::Status { status, body }) => {
            warn!(
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or(""),
                response_body = %body,
                event = %args.event,
                user_id = %args.user_id,
                url = %transport.endpoint(),
                "PostHog tracking failed"
            );
        }
        Err(e) => {
            warn!(
                error = %e,
                event = %args.event,
                user_id = %args.user_id,
                url = %transport.endpoint(),
                "PostHog tracking failed"
            );
        }
    }
}
