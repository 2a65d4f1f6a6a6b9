use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::graph::GraphError;
use crate::kernel::error::{Error, ErrorCategory, ErrorSeverity, RaisedError};
use crate::recovery::{ErrorRecoveryManager, RecoveryStrategy, StrategyKind, recover_fn};

fn raised(category: ErrorCategory, severity: ErrorSeverity) -> Error {
    RaisedError::new(category, "boom").with_severity(severity).into()
}

/// Handler that fails until it has been called `succeed_on` times.
fn counting_handler(calls: Arc<AtomicU32>, succeed_on: u32) -> Arc<dyn crate::recovery::RecoveryHandler> {
    recover_fn(move |_record| {
        let calls = calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= succeed_on {
                Ok(())
            } else {
                Err(Error::from(format!("attempt {} failed", n)))
            }
        }
    })
}

#[tokio::test]
async fn test_skip_strategy_recovers_event_error() {
    let manager = ErrorRecoveryManager::new();
    manager.register_strategy(ErrorCategory::Event, RecoveryStrategy::Skip);

    assert!(manager.recover(&raised(ErrorCategory::Event, ErrorSeverity::Medium)).await);

    let history = manager.get_recovery_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].strategy, Some(StrategyKind::Skip));
    assert!(history[0].success);
    assert_eq!(history[0].error.category, ErrorCategory::Event);
}

#[tokio::test]
async fn test_critical_error_is_never_recovered() {
    let manager = ErrorRecoveryManager::new();
    manager.register_strategy(ErrorCategory::Event, RecoveryStrategy::Skip);

    let err = raised(ErrorCategory::Event, ErrorSeverity::Critical);
    assert!(!manager.recover(&err).await);

    let history = manager.get_recovery_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].strategy, None);
    assert!(!history[0].success);
}

#[tokio::test]
async fn test_unrecoverable_error_bypasses_strategy() {
    let manager = ErrorRecoveryManager::new();
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_strategy(ErrorCategory::Plugin, RecoveryStrategy::Custom(counting_handler(calls.clone(), 1)));

    let err: Error = RaisedError::new(ErrorCategory::Plugin, "fatal").unrecoverable().into();
    assert!(!manager.recover(&err).await);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_circular_dependency_is_a_hard_stop() {
    let manager = ErrorRecoveryManager::new();
    manager.register_strategy(ErrorCategory::Lifecycle, RecoveryStrategy::Skip);

    let err: Error = GraphError::CircularDependency {
        node: "a".to_string(),
        path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    }
    .into();
    assert!(!manager.recover(&err).await);
}

#[tokio::test]
async fn test_default_policy_skips_low_and_fails_others() {
    let manager = ErrorRecoveryManager::new();

    assert!(manager.recover(&raised(ErrorCategory::Cache, ErrorSeverity::Low)).await);
    assert!(!manager.recover(&raised(ErrorCategory::Cache, ErrorSeverity::Medium)).await);
    assert!(!manager.recover(&raised(ErrorCategory::Cache, ErrorSeverity::High)).await);

    let history = manager.get_recovery_history();
    assert_eq!(history[0].strategy, Some(StrategyKind::Skip));
    assert_eq!(history[1].strategy, None);
}

#[tokio::test]
async fn test_use_default_reports_success() {
    let manager = ErrorRecoveryManager::new();
    manager.register_strategy(ErrorCategory::State, RecoveryStrategy::UseDefault(serde_json::json!({ "count": 0 })));

    assert!(manager.recover(&raised(ErrorCategory::State, ErrorSeverity::High)).await);
    assert_eq!(manager.strategy_for(ErrorCategory::State), Some(StrategyKind::UseDefault));
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let manager = ErrorRecoveryManager::new();
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_strategy(ErrorCategory::Middleware, RecoveryStrategy::retry(5, counting_handler(calls.clone(), 3)));

    assert!(manager.recover(&raised(ErrorCategory::Middleware, ErrorSeverity::Medium)).await);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_retries() {
    let manager = ErrorRecoveryManager::new();
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_strategy(ErrorCategory::Middleware, RecoveryStrategy::retry(2, counting_handler(calls.clone(), 10)));

    assert!(!manager.recover(&raised(ErrorCategory::Middleware, ErrorSeverity::Medium)).await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_without_count_uses_configured_default() {
    let manager = ErrorRecoveryManager::with_limits(100, 4);
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_strategy(
        ErrorCategory::Di,
        RecoveryStrategy::Retry {
            max_retries: None,
            handler: counting_handler(calls.clone(), 10),
        },
    );

    assert!(!manager.recover(&raised(ErrorCategory::Di, ErrorSeverity::Medium)).await);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_custom_strategy_runs_once() {
    let manager = ErrorRecoveryManager::new();
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_strategy(ErrorCategory::Config, RecoveryStrategy::Custom(counting_handler(calls.clone(), 2)));

    assert!(!manager.recover(&raised(ErrorCategory::Config, ErrorSeverity::Medium)).await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(manager.recover(&raised(ErrorCategory::Config, ErrorSeverity::Medium)).await);
}

#[tokio::test]
async fn test_success_rate_seven_of_ten() {
    let manager = ErrorRecoveryManager::new();
    manager.register_strategy(ErrorCategory::Event, RecoveryStrategy::Skip);

    for _ in 0..7 {
        assert!(manager.recover(&raised(ErrorCategory::Event, ErrorSeverity::Medium)).await);
    }
    for _ in 0..3 {
        assert!(!manager.recover(&raised(ErrorCategory::State, ErrorSeverity::Medium)).await);
    }

    assert!((manager.get_success_rate(None) - 0.7).abs() < 1e-9);
    assert!((manager.get_success_rate(Some(ErrorCategory::Event)) - 1.0).abs() < 1e-9);
    assert_eq!(manager.get_success_rate(Some(ErrorCategory::State)), 0.0);
}

#[tokio::test]
async fn test_success_rate_of_empty_history_is_zero() {
    let manager = ErrorRecoveryManager::new();
    assert_eq!(manager.get_success_rate(None), 0.0);
    assert_eq!(manager.get_success_rate(Some(ErrorCategory::Plugin)), 0.0);
}

#[tokio::test]
async fn test_history_is_bounded_and_clearable() {
    let manager = ErrorRecoveryManager::with_limits(3, 1);
    for severity in [ErrorSeverity::Low, ErrorSeverity::Medium, ErrorSeverity::High, ErrorSeverity::Low] {
        manager.recover(&raised(ErrorCategory::Unknown, severity)).await;
    }

    let history = manager.get_recovery_history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].error.severity, ErrorSeverity::Medium);
    assert_eq!(history[2].error.severity, ErrorSeverity::Low);

    manager.clear_history();
    assert!(manager.get_recovery_history().is_empty());
}

#[tokio::test]
async fn test_history_json_and_details() {
    let manager = ErrorRecoveryManager::new();
    let err: Error = RaisedError::new(ErrorCategory::Cache, "miss")
        .with_code("CACHE_MISS")
        .with_severity(ErrorSeverity::Low)
        .with_detail("key", "user:1")
        .into();
    manager.recover(&err).await;

    let history = manager.get_recovery_history();
    assert_eq!(history[0].error.code, "CACHE_MISS");
    assert_eq!(history[0].error.details["key"], serde_json::json!("user:1"));

    let json = manager.history_json().unwrap();
    assert!(json.contains("\"CACHE_MISS\""));
    assert!(json.contains("\"SKIP\""));
}

#[test]
fn test_remove_strategy() {
    let manager = ErrorRecoveryManager::new();
    manager.register_strategy(ErrorCategory::Plugin, RecoveryStrategy::Skip);
    assert!(manager.remove_strategy(ErrorCategory::Plugin));
    assert!(!manager.remove_strategy(ErrorCategory::Plugin));
    assert_eq!(manager.strategy_for(ErrorCategory::Plugin), None);
}

#[tokio::test]
async fn test_retry_waits_between_attempts() {
    let config = crate::config::RecoveryConfig {
        retry_delay_ms: 5,
        ..Default::default()
    };
    let manager = ErrorRecoveryManager::from_config(&config);
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_strategy(ErrorCategory::State, RecoveryStrategy::retry(3, counting_handler(calls.clone(), 3)));

    let started = std::time::Instant::now();
    assert!(manager.recover(&raised(ErrorCategory::State, ErrorSeverity::Medium)).await);
    assert!(started.elapsed() >= std::time::Duration::from_millis(10));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_use_default_value_is_available_to_callers() {
    let manager = ErrorRecoveryManager::new();
    let fallback = serde_json::json!({ "count": 0 });
    manager.register_strategy(ErrorCategory::State, RecoveryStrategy::UseDefault(fallback.clone()));

    assert_eq!(manager.default_value(ErrorCategory::State), Some(fallback.clone()));
    assert_eq!(manager.default_value(ErrorCategory::Event), None);

    assert!(manager.recover(&raised(ErrorCategory::State, ErrorSeverity::High)).await);
    let outcome = manager.last_outcome().unwrap();
    assert_eq!(outcome.strategy, Some(StrategyKind::UseDefault));
    assert_eq!(outcome.default_value, Some(fallback));

    manager.register_strategy(ErrorCategory::Event, RecoveryStrategy::Skip);
    assert!(manager.recover(&raised(ErrorCategory::Event, ErrorSeverity::High)).await);
    assert_eq!(manager.last_outcome().unwrap().default_value, None);
}

#[tokio::test]
async fn test_zero_history_limit_keeps_latest_outcome() {
    let manager = ErrorRecoveryManager::with_limits(0, 1);
    assert_eq!(manager.history_limit(), 1);

    manager.recover(&raised(ErrorCategory::Unknown, ErrorSeverity::Medium)).await;
    manager.recover(&raised(ErrorCategory::Unknown, ErrorSeverity::Low)).await;

    let history = manager.get_recovery_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].error.severity, ErrorSeverity::Low);
    assert_eq!(manager.get_success_rate(None), 1.0);
}
