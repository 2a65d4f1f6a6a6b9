//! # Keel DI Errors
use thiserror::Error;

use crate::kernel::error::{Classify, Error as KernelError, ErrorCategory, ErrorSeverity};

#[derive(Debug, Error)]
pub enum DiError {
    #[error("Service '{token}' is already registered")]
    AlreadyRegistered { token: String },

    #[error("Service '{token}' is not registered")]
    NotRegistered { token: String },

    #[error("Circular dependency while resolving '{token}': {}", .path.join(" -> "))]
    CircularDependency { token: String, path: Vec<String> },

    #[error("Service '{token}' does not hold a value of type {expected}")]
    TypeMismatch { token: String, expected: &'static str },

    #[error("Service '{owner}' has no injected dependency '{dependency}'")]
    InjectionMissing { owner: String, dependency: String },

    #[error("Failed to construct service '{token}': {source}")]
    ConstructionFailed {
        token: String,
        #[source]
        source: Box<KernelError>,
    },
}

impl Classify for DiError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Di
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            DiError::CircularDependency { .. } | DiError::TypeMismatch { .. } => ErrorSeverity::High,
            DiError::ConstructionFailed { source, .. } => source.severity(),
            _ => ErrorSeverity::Medium,
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            DiError::CircularDependency { .. } | DiError::TypeMismatch { .. } => false,
            DiError::ConstructionFailed { source, .. } => source.is_recoverable(),
            _ => true,
        }
    }

    fn code(&self) -> &str {
        match self {
            DiError::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            DiError::NotRegistered { .. } => "NOT_REGISTERED",
            DiError::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            DiError::TypeMismatch { .. } => "TYPE_MISMATCH",
            DiError::InjectionMissing { .. } => "INJECTION_MISSING",
            DiError::ConstructionFailed { .. } => "CONSTRUCTION_FAILED",
        }
    }
}
