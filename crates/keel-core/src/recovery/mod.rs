//! # Keel Error Recovery
//!
//! [`ErrorRecoveryManager`] decides whether a raised [`Error`](crate::kernel::error::Error)
//! can be handled. Strategies are registered per [`ErrorCategory`](crate::kernel::error::ErrorCategory);
//! unrecoverable and CRITICAL errors are never handed to one.
pub mod manager;
pub mod record;
pub mod strategy;

pub use manager::ErrorRecoveryManager;
pub use record::{ErrorRecord, RecoveryOutcome};
pub use strategy::{RecoveryHandler, RecoveryStrategy, StrategyKind, recover_fn};

/// Result of an operation whose failures are routed through recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation ran to completion.
    Completed,
    /// The operation failed and recovery handled the error. Its side effect
    /// may not have happened.
    Recovered,
}

impl Outcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Outcome::Recovered)
    }
}

#[cfg(test)]
mod tests;
