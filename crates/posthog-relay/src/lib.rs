//! Fire-and-forget PostHog event tracking for transactional code.
//!
//! Mutations hand each event to a scheduler; a deferred handler then
//! posts it to the PostHog capture endpoint. Delivery is best effort:
//! failures are logged with `tracing` and the event is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use posthog_relay::{EventRequest, MutationCtx, PostHog};
//!
//! #[tokio::main]
//! async fn main() {
//!     let posthog = PostHog::builder().api_key("phc_xxx").build();
//!     let ctx = MutationCtx::tokio();
//!
//!     posthog
//!         .track_user_event(&ctx, EventRequest::new("user_123", "user_signed_up"))
//!         .await;
//! }
//! ```

mod builders;
mod client;
mod config;
mod error;
mod handler;
mod scheduler;
mod transport;
pub mod types;

pub use builders::TrackBuilder;
pub use client::{PostHog, SendableTrack};
pub use config::{Config, PostHogBuilder, API_KEY_ENV, DEFAULT_HOST, HOST_ENV};
pub use error::Error;
pub use handler::track_event;
pub use scheduler::{MutationCtx, RunMutationCtx, ScheduledCall, Scheduler, TokioScheduler};
pub use transport::{capture_url, CAPTURE_PATH};
pub use types::{CapturePayload, EventRequest, TrackEventArgs, LIB_NAME, LIB_VERSION};
