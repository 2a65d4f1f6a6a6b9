//! # Keel Kernel Errors
//!
//! Defines the kernel-wide [`Error`] type and the classification taxonomy
//! shared by every subsystem.
//!
//! Each subsystem owns a typed error enum (graph, manager, plugin system, DI,
//! middleware, config) which converts into [`Error`] via `#[from]`. Every error,
//! whatever its origin, answers the four questions the recovery manager asks
//! through the [`Classify`] trait: which [`ErrorCategory`], which
//! [`ErrorSeverity`], whether it is recoverable and which machine-readable code.
//! Plugin and middleware authors raise their own failures with [`RaisedError`].
use std::collections::HashMap;
use std::fmt;
use std::result::Result as StdResult;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::di::error::DiError;
use crate::graph::error::GraphError;
use crate::manager::error::ManagerError;
use crate::middleware::error::MiddlewareError;
use crate::plugin_system::error::PluginSystemError;

/// Subsystem an error belongs to. Recovery strategies are registered per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Plugin,
    State,
    Event,
    Middleware,
    Lifecycle,
    Di,
    Config,
    Cache,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Plugin => "PLUGIN",
            ErrorCategory::State => "STATE",
            ErrorCategory::Event => "EVENT",
            ErrorCategory::Middleware => "MIDDLEWARE",
            ErrorCategory::Lifecycle => "LIFECYCLE",
            ErrorCategory::Di => "DI",
            ErrorCategory::Config => "CONFIG",
            ErrorCategory::Cache => "CACHE",
            ErrorCategory::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// How bad an error is. `Critical` always bypasses recovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorSeverity::Low => "LOW",
            ErrorSeverity::Medium => "MEDIUM",
            ErrorSeverity::High => "HIGH",
            ErrorSeverity::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Classification every kernel error exposes to the recovery manager.
pub trait Classify {
    fn category(&self) -> ErrorCategory;

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Medium
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    /// Machine-readable code, e.g. `DEPENDENCY_MISSING`.
    fn code(&self) -> &str;
}

/// An error raised by plugin, middleware or service code, classified explicitly
/// by its author.
#[derive(Debug, ThisError)]
#[error("[{code}] {message}")]
pub struct RaisedError {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub recoverable: bool,
    pub details: HashMap<String, serde_json::Value>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RaisedError {
    /// Medium severity, recoverable, code `RAISED`.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            code: "RAISED".to_string(),
            message: message.into(),
            category,
            severity: ErrorSeverity::default(),
            recoverable: true,
            details: HashMap::new(),
            source: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Marks the error as one recovery must never paper over.
    pub fn unrecoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }

    /// Attaches a detail value. Values that fail to serialize are stored as `null`.
    pub fn with_detail<V: Serialize>(mut self, key: &str, value: V) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.details.insert(key.to_string(), value);
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }
}

impl Classify for RaisedError {
    fn category(&self) -> ErrorCategory {
        self.category
    }

    fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    fn code(&self) -> &str {
        &self.code
    }
}

/// Kernel-wide error type.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Dependency graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Manager registry error: {0}")]
    Manager(#[from] ManagerError),

    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Dependency injection error: {0}")]
    Di(#[from] DiError),

    #[error("Middleware error: {0}")]
    Middleware(#[from] MiddlewareError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycle {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error(transparent)]
    Raised(#[from] RaisedError),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Initialize")]
    Initialize,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn lifecycle(
        phase: KernelLifecyclePhase,
        component_name: Option<&str>,
        message: impl Into<String>,
        source: Option<Error>,
    ) -> Self {
        Error::KernelLifecycle {
            phase,
            component_name: component_name.map(str::to_string),
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    /// Details attached to the error, empty for kernel-generated errors.
    pub fn details(&self) -> HashMap<String, serde_json::Value> {
        match self {
            Error::Raised(raised) => raised.details.clone(),
            _ => HashMap::new(),
        }
    }
}

impl Classify for Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Error::Graph(e) => e.category(),
            Error::Manager(e) => e.category(),
            Error::PluginSystem(e) => e.category(),
            Error::Di(e) => e.category(),
            Error::Middleware(e) => e.category(),
            Error::Config(e) => e.category(),
            Error::KernelLifecycle { .. } => ErrorCategory::Lifecycle,
            Error::Raised(e) => e.category(),
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Error::Graph(e) => e.severity(),
            Error::Manager(e) => e.severity(),
            Error::PluginSystem(e) => e.severity(),
            Error::Di(e) => e.severity(),
            Error::Middleware(e) => e.severity(),
            Error::Config(e) => e.severity(),
            Error::KernelLifecycle { source, .. } => source
                .as_ref()
                .map(|s| s.severity().max(ErrorSeverity::High))
                .unwrap_or(ErrorSeverity::High),
            Error::Raised(e) => e.severity(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Error::Graph(e) => e.is_recoverable(),
            Error::Manager(e) => e.is_recoverable(),
            Error::PluginSystem(e) => e.is_recoverable(),
            Error::Di(e) => e.is_recoverable(),
            Error::Middleware(e) => e.is_recoverable(),
            Error::Config(e) => e.is_recoverable(),
            Error::KernelLifecycle { source, .. } => {
                source.as_ref().map_or(true, |s| s.is_recoverable())
            }
            Error::Raised(e) => e.is_recoverable(),
        }
    }

    fn code(&self) -> &str {
        match self {
            Error::Graph(e) => e.code(),
            Error::Manager(e) => e.code(),
            Error::PluginSystem(e) => e.code(),
            Error::Di(e) => e.code(),
            Error::Middleware(e) => e.code(),
            Error::Config(e) => e.code(),
            Error::KernelLifecycle { .. } => "LIFECYCLE_FAILED",
            Error::Raised(e) => e.code(),
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Raised(RaisedError::new(ErrorCategory::Unknown, msg))
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Raised(RaisedError::new(ErrorCategory::Unknown, msg))
    }
}
