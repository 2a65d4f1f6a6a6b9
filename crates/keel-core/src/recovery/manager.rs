use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;

use crate::config::RecoveryConfig;
use crate::kernel::constants::{DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_RETRIES};
use crate::kernel::error::{Error, ErrorCategory, ErrorSeverity};
use crate::recovery::record::{ErrorRecord, RecoveryOutcome};
use crate::recovery::strategy::{RecoveryStrategy, StrategyKind};

/// Classifies raised errors, runs the strategy registered for their category
/// and keeps a bounded history of every attempt.
pub struct ErrorRecoveryManager {
    strategies: RwLock<HashMap<ErrorCategory, RecoveryStrategy>>,
    history: Mutex<VecDeque<RecoveryOutcome>>,
    history_limit: usize,
    default_max_retries: u32,
    retry_delay: Duration,
}

impl Default for ErrorRecoveryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorRecoveryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategies = self.strategies.read().unwrap_or_else(|e| e.into_inner());
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("ErrorRecoveryManager")
            .field("strategies", &strategies.len())
            .field("history", &history.len())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

impl ErrorRecoveryManager {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_RETRIES)
    }

    pub fn from_config(config: &RecoveryConfig) -> Self {
        Self::with_limits(config.history_limit, config.default_max_retries)
            .with_retry_delay(Duration::from_millis(config.retry_delay_ms))
    }

    /// A `history_limit` of 0 is raised to 1 so the latest outcome is
    /// always inspectable.
    pub fn with_limits(history_limit: usize, default_max_retries: u32) -> Self {
        if history_limit == 0 {
            log::warn!("Recovery history limit of 0 raised to 1");
        }
        Self {
            strategies: RwLock::new(HashMap::new()),
            history: Mutex::new(VecDeque::new()),
            history_limit: history_limit.max(1),
            default_max_retries,
            retry_delay: Duration::ZERO,
        }
    }

    /// Pause between two RETRY attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Registers (or replaces) the strategy for a category.
    pub fn register_strategy(&self, category: ErrorCategory, strategy: RecoveryStrategy) {
        log::debug!("Registering {} recovery strategy for {}", strategy.kind(), category);
        let mut strategies = self.strategies.write().unwrap_or_else(|e| e.into_inner());
        if strategies.insert(category, strategy).is_some() {
            log::warn!("Replaced existing recovery strategy for {}", category);
        }
    }

    pub fn remove_strategy(&self, category: ErrorCategory) -> bool {
        let mut strategies = self.strategies.write().unwrap_or_else(|e| e.into_inner());
        strategies.remove(&category).is_some()
    }

    pub fn strategy_for(&self, category: ErrorCategory) -> Option<StrategyKind> {
        let strategies = self.strategies.read().unwrap_or_else(|e| e.into_inner());
        strategies.get(&category).map(RecoveryStrategy::kind)
    }

    /// The value substituted for errors of `category`, if its strategy is
    /// USE_DEFAULT.
    pub fn default_value(&self, category: ErrorCategory) -> Option<serde_json::Value> {
        let strategies = self.strategies.read().unwrap_or_else(|e| e.into_inner());
        match strategies.get(&category) {
            Some(RecoveryStrategy::UseDefault(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Attempts recovery. Returns `true` when the error was handled.
    ///
    /// Unrecoverable and CRITICAL errors fail before any strategy is looked
    /// up. Categories without a strategy skip LOW severity errors and fail
    /// everything else.
    pub async fn recover(&self, error: &Error) -> bool {
        let record = ErrorRecord::from_error(error);

        if record.is_hard_stop() {
            log::error!(
                "Not recovering from {} error [{}] ({}, recoverable: {})",
                record.category,
                record.code,
                record.severity,
                record.recoverable
            );
            self.push_outcome(record, None, false, None);
            return false;
        }

        let strategy = {
            let strategies = self.strategies.read().unwrap_or_else(|e| e.into_inner());
            strategies.get(&record.category).cloned()
        };

        let substituted = match &strategy {
            Some(RecoveryStrategy::UseDefault(value)) => Some(value.clone()),
            _ => None,
        };
        let (kind, success) = match strategy {
            Some(strategy) => (Some(strategy.kind()), self.run_strategy(&strategy, &record).await),
            None if record.severity == ErrorSeverity::Low => {
                log::debug!("Skipping low severity {} error [{}]", record.category, record.code);
                (Some(StrategyKind::Skip), true)
            }
            None => {
                log::warn!("No recovery strategy for {} error [{}]", record.category, record.code);
                (None, false)
            }
        };

        if success {
            log::info!("Recovered from {} error [{}]", record.category, record.code);
        } else {
            log::warn!("Recovery failed for {} error [{}]", record.category, record.code);
        }
        self.push_outcome(record, kind, success, substituted.filter(|_| success));
        success
    }

    async fn run_strategy(&self, strategy: &RecoveryStrategy, record: &ErrorRecord) -> bool {
        match strategy {
            RecoveryStrategy::Skip => true,
            RecoveryStrategy::UseDefault(value) => {
                log::debug!("Substituting default value {} for [{}]", value, record.code);
                true
            }
            RecoveryStrategy::Retry { max_retries, handler } => {
                let attempts = max_retries.unwrap_or(self.default_max_retries);
                for attempt in 1..=attempts {
                    match handler.attempt(record).await {
                        Ok(()) => return true,
                        Err(err) => {
                            log::warn!("Recovery attempt {}/{} for [{}] failed: {}", attempt, attempts, record.code, err);
                            if attempt < attempts && !self.retry_delay.is_zero() {
                                tokio::time::sleep(self.retry_delay).await;
                            }
                        }
                    }
                }
                false
            }
            RecoveryStrategy::Custom(handler) => match handler.attempt(record).await {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Custom recovery for [{}] failed: {}", record.code, err);
                    false
                }
            },
        }
    }

    fn push_outcome(
        &self,
        error: ErrorRecord,
        strategy: Option<StrategyKind>,
        success: bool,
        default_value: Option<serde_json::Value>,
    ) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push_back(RecoveryOutcome {
            error,
            strategy,
            success,
            default_value,
            timestamp: Utc::now(),
        });
        while history.len() > self.history_limit {
            history.pop_front();
        }
    }

    /// The most recent outcome.
    pub fn last_outcome(&self) -> Option<RecoveryOutcome> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.back().cloned()
    }

    /// History, oldest first.
    pub fn get_recovery_history(&self) -> Vec<RecoveryOutcome> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Share of successful outcomes, optionally for one category. `0.0` when
    /// there is nothing to count.
    pub fn get_success_rate(&self, category: Option<ErrorCategory>) -> f64 {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let (total, succeeded) = history
            .iter()
            .filter(|o| category.is_none_or(|c| o.error.category == c))
            .fold((0usize, 0usize), |(total, ok), o| (total + 1, ok + usize::from(o.success)));
        if total == 0 {
            0.0
        } else {
            succeeded as f64 / total as f64
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn history_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.get_recovery_history())
    }
}
