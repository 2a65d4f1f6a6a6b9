//! # keel-core
//!
//! Plugin and service orchestration kernel: dependency ordering of managers
//! and plugins, a priority-ordered middleware chain, a dependency-injection
//! container and error recovery.
pub mod config;
pub mod di;
pub mod graph;
pub mod kernel;
pub mod manager;
pub mod middleware;
pub mod plugin_system;
pub mod recovery;

// Re-export key public types/traits for the binary and plugins
pub use config::KernelConfig;
pub use di::{DiContainer, Lifetime, Token};
pub use graph::DependencyGraph;
pub use kernel::Kernel;
pub use kernel::error::{Classify, Error as KernelError, ErrorCategory, ErrorSeverity, RaisedError};
pub use manager::{Manager, ManagerRegistry};
pub use middleware::{Middleware, MiddlewareContext, MiddlewarePipeline, Next};
pub use plugin_system::{Plugin, PluginContext, PluginSystem};
pub use recovery::{ErrorRecoveryManager, Outcome, RecoveryStrategy};
