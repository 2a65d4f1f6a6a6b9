use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::BoxFuture;
use crate::kernel::error::{Error, Result};
use crate::middleware::context::MiddlewareContext;
use crate::middleware::pipeline::Next;

/// One link of the middleware chain.
///
/// `execute` continues the chain by running `next`; returning without doing so
/// stops every entry after this one.
#[async_trait]
pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32 {
        0
    }

    async fn execute(&self, ctx: &mut MiddlewareContext, next: Next<'_>) -> Result<()>;

    /// Called with any error `execute` returned, including ones bubbling up
    /// from later entries. Returning `Ok` stops the error here; the default
    /// hands it on.
    async fn on_error(&self, error: Error, _ctx: &mut MiddlewareContext) -> Result<()> {
        Err(error)
    }
}

type MiddlewareClosure = dyn for<'c> Fn(&'c mut MiddlewareContext, Next<'c>) -> BoxFuture<'c, Result<()>> + Send + Sync;

struct FnMiddleware {
    name: String,
    priority: i32,
    f: Box<MiddlewareClosure>,
}

#[async_trait]
impl Middleware for FnMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn execute(&self, ctx: &mut MiddlewareContext, next: Next<'_>) -> Result<()> {
        (self.f)(ctx, next).await
    }
}

/// Wraps a closure as a [`Middleware`] without an error handler.
///
/// ```
/// use keel_core::middleware::{Middleware, middleware_fn};
///
/// let timing = middleware_fn("timing", 10, |ctx, next| {
///     Box::pin(async move {
///         ctx.set_metadata("timed", "yes");
///         next.run(ctx).await
///     })
/// });
/// assert_eq!(timing.name(), "timing");
/// ```
pub fn middleware_fn<F>(name: &str, priority: i32, f: F) -> Arc<dyn Middleware>
where
    F: for<'c> Fn(&'c mut MiddlewareContext, Next<'c>) -> BoxFuture<'c, Result<()>> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware {
        name: name.to_string(),
        priority,
        f: Box::new(f),
    })
}
