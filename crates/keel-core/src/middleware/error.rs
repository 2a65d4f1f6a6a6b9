//! # Keel Middleware Errors
use thiserror::Error;

use crate::kernel::error::{Classify, ErrorCategory};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiddlewareError {
    #[error("Middleware '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Middleware name must not be empty")]
    EmptyName,
}

impl Classify for MiddlewareError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Middleware
    }

    fn code(&self) -> &str {
        match self {
            MiddlewareError::AlreadyRegistered { .. } => "MIDDLEWARE_ALREADY_REGISTERED",
            MiddlewareError::EmptyName => "MIDDLEWARE_INVALID_NAME",
        }
    }
}
