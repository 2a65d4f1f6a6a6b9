use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kernel::error::{Classify, Error, ErrorCategory, ErrorSeverity};
use crate::recovery::strategy::StrategyKind;

/// Snapshot of a raised error as seen by the recovery manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub recoverable: bool,
    pub timestamp: DateTime<Utc>,
    pub details: HashMap<String, serde_json::Value>,
}

impl ErrorRecord {
    pub fn from_error(error: &Error) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            category: error.category(),
            severity: error.severity(),
            recoverable: error.is_recoverable(),
            timestamp: Utc::now(),
            details: error.details(),
        }
    }

    /// True for errors recovery must never attempt.
    pub fn is_hard_stop(&self) -> bool {
        !self.recoverable || self.severity == ErrorSeverity::Critical
    }
}

/// One entry of the recovery history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub error: ErrorRecord,
    /// `None` when no strategy was consulted (hard stop or no applicable policy).
    pub strategy: Option<StrategyKind>,
    pub success: bool,
    /// The value a USE_DEFAULT strategy substituted for the failed result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}
