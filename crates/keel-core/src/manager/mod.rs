//! # Keel Manager Registry
//!
//! Tracks the kernel's internal subsystems ("managers"): what they depend on,
//! whether they initialize lazily, and when and how their initialization went.
//! Ordering and validation are delegated to [`DependencyGraph`](crate::graph::DependencyGraph).
//!
//! The registry is an ordinary value owned by whoever hosts the kernel.
//! [`global_registry`] exists for hosts that want one process-wide instance;
//! nothing in the kernel itself uses it.
pub mod error;
pub mod registry;
pub mod traits;

use std::sync::{Mutex, OnceLock};

pub use error::ManagerError;
pub use registry::{DependencyCheck, ManagerRegistry, ManagerStatus};
pub use traits::Manager;

static GLOBAL_REGISTRY: OnceLock<Mutex<ManagerRegistry>> = OnceLock::new();

/// Process-wide default registry, created on first use.
pub fn global_registry() -> &'static Mutex<ManagerRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| Mutex::new(ManagerRegistry::new()))
}
