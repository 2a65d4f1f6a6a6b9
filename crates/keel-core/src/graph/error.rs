//! # Keel Dependency Graph Errors
use thiserror::Error;

use crate::kernel::error::{Classify, ErrorCategory, ErrorSeverity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// `node` is where the walk re-entered an in-progress node.
    #[error("Circular dependency detected at '{node}': {}", .path.join(" -> "))]
    CircularDependency { node: String, path: Vec<String> },

    #[error("Node '{node}' depends on '{dependency}', which is not registered")]
    MissingDependency { node: String, dependency: String },
}

impl Classify for GraphError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Lifecycle
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            GraphError::CircularDependency { .. } => ErrorSeverity::Critical,
            GraphError::MissingDependency { .. } => ErrorSeverity::High,
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn code(&self) -> &str {
        match self {
            GraphError::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            GraphError::MissingDependency { .. } => "DEPENDENCY_MISSING",
        }
    }
}
