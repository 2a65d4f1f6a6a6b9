use std::time::Instant;

use async_trait::async_trait;
use keel_core::kernel::error::Result as KernelResult;
use keel_core::{MiddlewareContext, Middleware, Next};

/// Wraps every pipeline run: logs when it starts and how it ended, and
/// stores the elapsed time in the `elapsed_ms` metadata entry.
///
/// Runs outermost so the measurement covers the whole chain. A request id in
/// the `request_id` metadata entry is attached to each event.
#[derive(Debug, Default)]
pub struct RequestLogMiddleware;

impl RequestLogMiddleware {
    pub const NAME: &'static str = "request-log";
    pub const PRIORITY: i32 = 1000;

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    async fn execute(&self, ctx: &mut MiddlewareContext, next: Next<'_>) -> KernelResult<()> {
        let request = ctx.metadata("request_id").unwrap_or("-").to_string();
        let started = Instant::now();
        tracing::debug!(request = %request, remaining = next.remaining(), "Pipeline run started");

        let result = next.run(ctx).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        ctx.set_metadata("elapsed_ms", &elapsed_ms.to_string());
        match &result {
            Ok(()) => tracing::info!(
                request = %request,
                steps = ctx.trail().len(),
                elapsed_ms,
                "Pipeline run finished"
            ),
            Err(err) => tracing::warn!(request = %request, elapsed_ms, error = %err, "Pipeline run failed"),
        }
        result
    }
}
