use keel_core::Token;

/// Service token under which the plugin registers its [`Logger`].
pub const LOGGER: Token<Logger> = Token::new("core-logging.logger");

/// Scoped handle for emitting events. The scope ends up in the `scope` field
/// of every event so output from different components can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    scope: String,
}

impl Logger {
    pub fn new(scope: impl Into<String>) -> Self {
        Self { scope: scope.into() }
    }

    /// A child logger, e.g. `keel` -> `keel.storage`.
    pub fn scoped(&self, child: &str) -> Self {
        Self::new(format!("{}.{}", self.scope, child))
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn trace(&self, message: &str) {
        tracing::trace!(scope = %self.scope, "{}", message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(scope = %self.scope, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(scope = %self.scope, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(scope = %self.scope, "{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(scope = %self.scope, "{}", message);
    }
}
