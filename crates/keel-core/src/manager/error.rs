//! # Keel Manager Registry Errors
use thiserror::Error;

use crate::kernel::error::{Classify, ErrorCategory, ErrorSeverity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("Manager '{name}' is not registered")]
    NotRegistered { name: String },

    #[error("Manager '{name}' cannot initialize, dependencies not ready: {missing:?}")]
    DependenciesNotReady { name: String, missing: Vec<String> },
}

impl Classify for ManagerError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Lifecycle
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::High
    }

    fn code(&self) -> &str {
        match self {
            ManagerError::NotRegistered { .. } => "MANAGER_NOT_REGISTERED",
            ManagerError::DependenciesNotReady { .. } => "DEPENDENCY_NOT_READY",
        }
    }
}
