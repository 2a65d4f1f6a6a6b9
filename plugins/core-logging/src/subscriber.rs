use keel_core::{ErrorCategory, KernelError, RaisedError};
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber writing to stderr, and routes
/// `log` records into it.
///
/// `level` is an `EnvFilter` directive string; `RUST_LOG` takes precedence
/// when set. `level` is validated either way. Returns `Ok(false)` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_subscriber(level: &str, json: bool) -> Result<bool, KernelError> {
    let configured = EnvFilter::try_new(level).map_err(|err| {
        RaisedError::new(ErrorCategory::Config, format!("Invalid log level '{}': {}", level, err))
            .with_code("INVALID_LOG_LEVEL")
            .unrecoverable()
            .with_detail("level", level)
    })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or(configured);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let subscriber: Box<dyn Subscriber + Send + Sync> = if json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return Ok(false);
    }
    if let Err(err) = LogTracer::init() {
        tracing::warn!(error = %err, "Another `log` logger is installed; log records are not bridged");
    }
    Ok(true)
}
