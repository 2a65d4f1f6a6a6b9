use std::fmt;
use std::sync::{Arc, RwLock};

use crate::kernel::BoxFuture;
use crate::kernel::error::Result;
use crate::middleware::context::MiddlewareContext;
use crate::middleware::error::MiddlewareError;
use crate::middleware::traits::Middleware;

/// Continuation handed to [`Middleware::execute`]: the rest of the chain.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    /// Runs the remaining entries. An error from an entry goes to that
    /// entry's `on_error` before it reaches the caller.
    pub fn run<'c>(self, ctx: &'c mut MiddlewareContext) -> BoxFuture<'c, Result<()>>
    where
        'a: 'c,
    {
        Box::pin(async move {
            let Some((current, rest)) = self.chain.split_first() else {
                ctx.mark_end();
                return Ok(());
            };

            ctx.enter(current.name());
            match current.execute(ctx, Next { chain: rest }).await {
                Ok(()) => Ok(()),
                Err(err) => {
                    log::debug!("Middleware '{}' raised: {}", current.name(), err);
                    current.on_error(err, ctx).await
                }
            }
        })
    }

    /// Number of entries still to run.
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }
}

/// Priority-ordered middleware chain.
#[derive(Default)]
pub struct MiddlewarePipeline {
    entries: RwLock<Vec<Arc<dyn Middleware>>>,
}

impl fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("entries", &self.names())
            .finish()
    }
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry after every entry of equal or higher priority.
    pub fn use_middleware(&self, middleware: Arc<dyn Middleware>) -> Result<()> {
        let name = middleware.name().to_string();
        if name.is_empty() {
            return Err(MiddlewareError::EmptyName.into());
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.iter().any(|m| m.name() == name) {
            return Err(MiddlewareError::AlreadyRegistered { name }.into());
        }

        let priority = middleware.priority();
        let position = entries
            .iter()
            .position(|m| m.priority() < priority)
            .unwrap_or(entries.len());
        entries.insert(position, middleware);
        log::debug!("Registered middleware '{}' (priority {}) at position {}", name, priority, position);
        Ok(())
    }

    pub fn remove(&self, name: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|m| m.name() != name);
        before != entries.len()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().find(|m| m.name() == name).cloned()
    }

    /// Entries in execution order.
    pub fn get_all(&self) -> Vec<Arc<dyn Middleware>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn size(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Runs the chain over `ctx`. Runs against the entries registered when
    /// the call starts; concurrent registrations affect later calls only.
    pub async fn execute(&self, ctx: &mut MiddlewareContext) -> Result<()> {
        let chain = self.get_all();
        ctx.reset_run();
        Next { chain: &chain }.run(ctx).await
    }
}
