//! Deferred execution.
//!
//! Transactional code may not perform network I/O, so tracking is handed
//! to a scheduler that runs it later in a detached task. Enqueueing never
//! waits on the outcome of the scheduled work.

use crate::handler;
use crate::types::TrackEventArgs;
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A function reference together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledCall {
    /// The PostHog `trackEvent` handler.
    TrackEvent(TrackEventArgs),
}

impl ScheduledCall {
    /// Name of the referenced function.
    pub fn function_name(&self) -> &'static str {
        match self {
            ScheduledCall::TrackEvent(_) => "lib:trackEvent",
        }
    }

    /// Execute the call.
    pub async fn run(self) {
        match self {
            ScheduledCall::TrackEvent(args) => handler::track_event(args).await,
        }
    }
}

/// Host scheduler for deferred calls.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Enqueue `call` to run after `delay`.
    ///
    /// Returns once the call is enqueued. The scheduled work is neither
    /// awaited nor cancellable.
    async fn run_after(&self, delay: Duration, call: ScheduledCall) -> Result<(), Error>;
}

/// Context of a mutation that can schedule deferred work.
pub trait RunMutationCtx {
    /// The scheduler of this context.
    fn scheduler(&self) -> &dyn Scheduler;
}

/// Scheduler running each call in its own tokio task.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn run_after(&self, delay: Duration, call: ScheduledCall) -> Result<(), Error> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Scheduler(e.to_string()))?;

        debug!(
            function = call.function_name(),
            delay_ms = delay.as_millis() as u64,
            "scheduling call"
        );

        handle.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            call.run().await;
        });

        Ok(())
    }
}

/// Mutation context backed by a shared scheduler.
#[derive(Clone)]
pub struct MutationCtx {
    scheduler: Arc<dyn Scheduler>,
}

impl MutationCtx {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Context scheduling onto the current tokio runtime.
    pub fn tokio() -> Self {
        Self::new(Arc::new(TokioScheduler::new()))
    }
}

impl RunMutationCtx for MutationCtx {
    fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }
}

impl std::fmt::Debug for MutationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCtx").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name() {
        let call = ScheduledCall::TrackEvent(TrackEventArgs::default());
        assert_eq!(call.function_name(), "lib:trackEvent");
    }

    #[tokio::test]
    async fn test_tokio_scheduler_returns_immediately() {
        let scheduler = TokioScheduler::new();
        let call = ScheduledCall::TrackEvent(TrackEventArgs::default());

        // An hour-long delay must not block enqueueing
        scheduler
            .run_after(Duration::from_secs(3600), call)
            .await
            .unwrap();
    }
}
