use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::kernel::BoxFuture;
use crate::kernel::error::Result;
use crate::recovery::record::ErrorRecord;

/// Discriminant of a [`RecoveryStrategy`], recorded in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    Skip,
    UseDefault,
    Retry,
    Custom,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Skip => "SKIP",
            StrategyKind::UseDefault => "USE_DEFAULT",
            StrategyKind::Retry => "RETRY",
            StrategyKind::Custom => "CUSTOM",
        };
        f.write_str(name)
    }
}

/// User code that tries to repair the situation behind an error.
/// An `Ok` return counts as a successful attempt.
#[async_trait]
pub trait RecoveryHandler: Send + Sync {
    async fn attempt(&self, record: &ErrorRecord) -> Result<()>;
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> RecoveryHandler for FnHandler<F>
where
    F: Fn(ErrorRecord) -> BoxFuture<'static, Result<()>> + Send + Sync,
{
    async fn attempt(&self, record: &ErrorRecord) -> Result<()> {
        (self.f)(record.clone()).await
    }
}

/// Wraps an async closure as a [`RecoveryHandler`].
pub fn recover_fn<F, Fut>(f: F) -> Arc<dyn RecoveryHandler>
where
    F: Fn(ErrorRecord) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnHandler {
        f: move |record: ErrorRecord| -> BoxFuture<'static, Result<()>> { Box::pin(f(record)) },
    })
}

/// Policy registered for one error category.
#[derive(Clone)]
pub enum RecoveryStrategy {
    /// Always succeeds without side effects.
    Skip,
    /// Succeeds; the value is what the caller should substitute.
    UseDefault(serde_json::Value),
    /// Calls the handler until it returns `Ok`, at most `max_retries` times.
    /// `None` falls back to the manager's configured default.
    Retry {
        max_retries: Option<u32>,
        handler: Arc<dyn RecoveryHandler>,
    },
    /// Calls the handler once.
    Custom(Arc<dyn RecoveryHandler>),
}

impl RecoveryStrategy {
    pub fn retry(max_retries: u32, handler: Arc<dyn RecoveryHandler>) -> Self {
        RecoveryStrategy::Retry {
            max_retries: Some(max_retries),
            handler,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            RecoveryStrategy::Skip => StrategyKind::Skip,
            RecoveryStrategy::UseDefault(_) => StrategyKind::UseDefault,
            RecoveryStrategy::Retry { .. } => StrategyKind::Retry,
            RecoveryStrategy::Custom(_) => StrategyKind::Custom,
        }
    }
}

impl fmt::Debug for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryStrategy::Skip => f.write_str("Skip"),
            RecoveryStrategy::UseDefault(value) => f.debug_tuple("UseDefault").field(value).finish(),
            RecoveryStrategy::Retry { max_retries, .. } => f
                .debug_struct("Retry")
                .field("max_retries", max_retries)
                .finish_non_exhaustive(),
            RecoveryStrategy::Custom(_) => f.debug_tuple("Custom").finish_non_exhaustive(),
        }
    }
}
