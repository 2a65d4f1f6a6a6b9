/// Kernel name
pub const KERNEL_NAME: &str = "keel";

/// Kernel version
pub const KERNEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Recovery outcomes kept before the oldest is evicted
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Attempts for a RETRY strategy registered without a count
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Log filter used when neither config nor environment set one
pub const DEFAULT_LOG_LEVEL: &str = "info";
