use std::any::Any;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::kernel::error::Result;

/// Lifecycle trait for the kernel's own subsystems (state, events, cache, ...).
///
/// Managers are registered with the kernel as `Arc<dyn Manager>` and initialized
/// in dependency order during bootstrap. Lazy managers are only initialized when
/// something pulls them through `Kernel::ensure_manager`.
#[async_trait]
pub trait Manager: Any + Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Names of managers that must be initialized first.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn is_lazy(&self) -> bool {
        false
    }

    async fn initialize(&self) -> Result<()>;

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
