//! Mutations that record analytics events.
//!
//! Run with `POSTHOG_API_KEY=phc_xxx RUST_LOG=debug cargo run --example signup`.
//! Without an API key every call logs a warning and schedules nothing.

use posthog_relay::{EventRequest, MutationCtx, PostHog, RunMutationCtx};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn signup_user(
    posthog: &PostHog,
    ctx: &impl RunMutationCtx,
    user_id: &str,
    email: &str,
    name: &str,
) {
    info!(email, "signing up user");

    posthog
        .track(ctx, "user_signed_up", user_id)
        .property("email", email)
        .property("name", name)
        .property("signupMethod", "email")
        .set_property("name", name)
        .send()
        .await;
}

async fn track_purchase(
    posthog: &PostHog,
    ctx: &impl RunMutationCtx,
    user_id: &str,
    product_id: &str,
    amount: f64,
) {
    info!(user_id, product_id, "user purchased product");

    posthog
        .track(ctx, "product_purchased", user_id)
        .property("productId", product_id)
        .property("amount", amount)
        .property("currency", "USD")
        .send()
        .await;
}

async fn track_custom_event(
    posthog: &PostHog,
    ctx: &impl RunMutationCtx,
    user_id: &str,
    event: &str,
    properties: Option<HashMap<String, serde_json::Value>>,
) {
    let mut request = EventRequest::new(user_id, event);
    request.properties = properties;
    posthog.track_user_event(ctx, request).await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let posthog = PostHog::from_env();
    let ctx = MutationCtx::tokio();

    signup_user(&posthog, &ctx, "user_123", "ada@example.com", "Ada").await;
    track_purchase(&posthog, &ctx, "user_123", "prod_42", 19.99).await;
    track_custom_event(
        &posthog,
        &ctx,
        "user_123",
        "opened_settings",
        Some(HashMap::from([("tab".to_string(), json!("billing"))])),
    )
    .await;

    // Scheduled deliveries run detached; give them a moment before exit
    tokio::time::sleep(Duration::from_secs(2)).await;
}
