//! PostHog client wrapper.

use crate::builders::TrackBuilder;
use crate::config::{Config, PostHogBuilder};
use crate::scheduler::{RunMutationCtx, ScheduledCall};
use crate::types::{EventRequest, TrackEventArgs};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// PostHog analytics client for mutation code.
///
/// Tracking never performs network I/O in the caller. Each call schedules
/// the `trackEvent` handler on the context's scheduler and returns as
/// soon as it is enqueued. Nothing here can fail the caller.
///
/// # Example
///
/// ```rust,no_run
/// use posthog_relay::{MutationCtx, PostHog};
///
/// # async fn example() {
/// let posthog = PostHog::from_env();
/// let ctx = MutationCtx::tokio();
///
/// posthog
///     .track(&ctx, "user_created", "user_123")
///     .property("email", "user@example.com")
///     .set_property("name", "John Doe")
///     .send()
///     .await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PostHog {
    config: Config,
}

impl PostHog {
    /// Create a new builder.
    pub fn builder() -> PostHogBuilder {
        PostHogBuilder::new()
    }

    /// Create a client configured from `POSTHOG_API_KEY` and `POSTHOG_HOST`.
    pub fn from_env() -> Self {
        PostHogBuilder::new().build()
    }

    /// Get the client configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Schedule a user event for delivery.
    ///
    /// Without an API key this logs a warning and schedules nothing.
    #[instrument(skip_all, fields(event = %data.event))]
    pub async fn track_user_event<C>(&self, ctx: &C, data: EventRequest)
    where
        C: RunMutationCtx + ?Sized,
    {
        if !self.config.is_enabled() {
            warn!("PostHog API key not configured, skipping event tracking");
            return;
        }

        let call = ScheduledCall::TrackEvent(TrackEventArgs {
            api_key: self.config.api_key.clone(),
            host: Some(self.config.host.clone()),
            user_id: data.user_id,
            event: data.event,
            properties: data.properties,
            set_properties: data.set_properties,
            set_once_properties: data.set_once_properties,
        });

        match ctx.scheduler().run_after(Duration::ZERO, call).await {
            Ok(()) => debug!("event scheduled"),
            Err(e) => warn!(error = %e, "PostHog: failed to schedule event tracking"),
        }
    }

    /// Start building a user event.
    pub fn track<'a, C>(
        &'a self,
        ctx: &'a C,
        event: impl Into<String>,
        user_id: impl Into<String>,
    ) -> SendableTrack<'a, C>
    where
        C: RunMutationCtx + ?Sized,
    {
        SendableTrack {
            builder: TrackBuilder::new(event, user_id),
            client: self,
            ctx,
        }
    }
}

impl PostHogBuilder {
    /// Build the PostHog client.
    pub fn build(self) -> PostHog {
        PostHog {
            config: self.build_config(),
        }
    }
}

/// Sendable track event builder.
pub struct SendableTrack<'a, C: ?Sized> {
    builder: TrackBuilder,
    client: &'a PostHog,
    ctx: &'a C,
}

impl<'a, C> SendableTrack<'a, C>
where
    C: RunMutationCtx + ?Sized,
{
    /// Add an event property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.builder = self.builder.property(key, value);
        self
    }

    /// Add a person property (`$set`).
    pub fn set_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.builder = self.builder.set_property(key, value);
        self
    }

    /// Add a person property set only once (`$set_once`).
    pub fn set_once_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.builder = self.builder.set_once_property(key, value);
        self
    }

    /// Schedule the event.
    pub async fn send(self) {
        self.client
            .track_user_event(self.ctx, self.builder.build())
            .await
    }
}
