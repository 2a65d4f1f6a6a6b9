use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::KernelConfig;
use crate::di::{Lifetime, Token};
use crate::kernel::Kernel;
use crate::kernel::error::{Classify, Error, ErrorCategory, ErrorSeverity, KernelLifecyclePhase, RaisedError, Result};
use crate::manager::{Manager, ManagerError};
use crate::middleware::{MiddlewareContext, middleware_fn};
use crate::plugin_system::{Plugin, PluginContext};
use crate::recovery::{Outcome, RecoveryStrategy};

type Tracker = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
struct TestManager {
    name: String,
    dependencies: Vec<String>,
    lazy: bool,
    tracker: Tracker,
    fail_init: AtomicBool,
}

impl TestManager {
    fn new(name: &str, dependencies: &[&str], lazy: bool, tracker: &Tracker) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            lazy,
            tracker: tracker.clone(),
            fail_init: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl Manager for TestManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn is_lazy(&self) -> bool {
        self.lazy
    }

    async fn initialize(&self) -> Result<()> {
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(RaisedError::new(ErrorCategory::State, "storage unavailable").into());
        }
        self.tracker.lock().unwrap().push(format!("init:{}", self.name));
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.tracker.lock().unwrap().push(format!("shutdown:{}", self.name));
        Ok(())
    }
}

struct CounterPlugin {
    tracker: Tracker,
}

const COUNTER: Token<Mutex<u32>> = Token::new("counter");

#[async_trait]
impl Plugin for CounterPlugin {
    fn name(&self) -> &str {
        "counter"
    }

    fn version(&self) -> &str {
        "0.3.1"
    }

    async fn install(&self, context: &PluginContext<'_>) -> Result<()> {
        self.tracker.lock().unwrap().push("install:counter".to_string());
        assert!(context.manager("state").is_some());
        context.container().register_instance(&COUNTER, Mutex::new(0))?;
        let container = context.container().clone();
        context.pipeline().use_middleware(middleware_fn("count", 0, move |ctx, next| {
            let container = container.clone();
            Box::pin(async move {
                if let Ok(counter) = container.resolve(&COUNTER) {
                    *counter.lock().unwrap() += 1;
                }
                next.run(ctx).await
            })
        }))?;
        Ok(())
    }

    async fn uninstall(&self, context: &PluginContext<'_>) -> Result<()> {
        self.tracker.lock().unwrap().push("uninstall:counter".to_string());
        context.pipeline().remove("count");
        Ok(())
    }
}

fn tracker() -> Tracker {
    Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test]
async fn test_bootstrap_initializes_in_dependency_order() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("events", &["state"], false, &log));
    kernel.register_manager(TestManager::new("state", &[], false, &log));
    kernel.register_manager(TestManager::new("cache", &["state"], true, &log));

    kernel.bootstrap().await.unwrap();

    assert!(kernel.is_bootstrapped());
    assert_eq!(*log.lock().unwrap(), vec!["init:state", "init:events"]);
    assert!(!kernel.managers().is_initialized("cache"));
    assert_eq!(kernel.managers().init_order(), ["state", "events"]);
    assert!(kernel.manager_of::<TestManager>().is_some());
}

#[tokio::test]
async fn test_lazy_manager_is_pulled_on_demand() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("state", &[], true, &log));
    kernel.register_manager(TestManager::new("cache", &["state"], true, &log));
    kernel.bootstrap().await.unwrap();
    assert!(log.lock().unwrap().is_empty());

    let cache = kernel.ensure_manager("cache").await.unwrap();
    assert_eq!(cache.name(), "cache");
    assert_eq!(*log.lock().unwrap(), vec!["init:state", "init:cache"]);

    kernel.ensure_manager("cache").await.unwrap();
    assert_eq!(log.lock().unwrap().len(), 2);

    let err = kernel.ensure_manager("missing").await.unwrap_err();
    assert!(matches!(err, Error::Manager(ManagerError::NotRegistered { .. })));
}

#[tokio::test]
async fn test_eager_manager_pulls_lazy_dependency() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("storage", &[], true, &log));
    kernel.register_manager(TestManager::new("state", &["storage"], false, &log));

    kernel.bootstrap().await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["init:storage", "init:state"]);
}

#[tokio::test]
async fn test_bootstrap_fails_on_cycle() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("manager-d", &["manager-e"], false, &log));
    kernel.register_manager(TestManager::new("manager-e", &["manager-d"], false, &log));

    let err = kernel.bootstrap().await.unwrap_err();
    assert_eq!(err.code(), "CIRCULAR_DEPENDENCY");
    assert_eq!(err.severity(), ErrorSeverity::Critical);
    assert!(!kernel.recovery().recover(&err).await);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_manager_records_error() {
    let log = tracker();
    let mut kernel = Kernel::new();
    let state = TestManager::new("state", &[], false, &log);
    state.fail_init.store(true, Ordering::SeqCst);
    kernel.register_manager(state);
    kernel.register_manager(TestManager::new("events", &["state"], false, &log));

    let err = kernel.bootstrap().await.unwrap_err();
    assert!(matches!(
        err,
        Error::KernelLifecycle { phase: KernelLifecyclePhase::Initialize, .. }
    ));

    let status = kernel.managers().status("state").unwrap();
    assert!(!status.initialized);
    assert!(status.error.is_some());
    assert!(!kernel.is_bootstrapped());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_second_bootstrap_is_rejected() {
    let mut kernel = Kernel::new();
    kernel.bootstrap().await.unwrap();
    let err = kernel.bootstrap().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Lifecycle);
}

#[tokio::test]
async fn test_duplicate_manager_is_ignored() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("state", &[], false, &log));
    kernel.register_manager(TestManager::new("state", &["other"], false, &log));

    assert_eq!(kernel.components().len(), 1);
    kernel.bootstrap().await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["init:state"]);
}

#[tokio::test]
async fn test_plugins_register_services_and_middleware() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("state", &[], false, &log));
    kernel.bootstrap().await.unwrap();

    let outcome = kernel.use_plugin(Arc::new(CounterPlugin { tracker: log.clone() })).await.unwrap();
    assert_eq!(outcome, Outcome::Completed);

    let mut ctx = MiddlewareContext::new();
    assert_eq!(kernel.execute(&mut ctx).await.unwrap(), Outcome::Completed);
    kernel.execute(&mut ctx).await.unwrap();

    let counter = kernel.resolve(&COUNTER).await.unwrap().unwrap();
    assert_eq!(*counter.lock().unwrap(), 2);

    kernel.uninstall_plugin("counter").await.unwrap();
    assert!(kernel.pipeline().is_empty());
    assert_eq!(kernel.plugins().size(), 0);
}

#[tokio::test]
async fn test_execute_routes_failures_through_recovery() {
    let kernel = Kernel::new();
    kernel
        .pipeline()
        .use_middleware(middleware_fn("flaky", 0, |_ctx, _next| {
            Box::pin(async move {
                Err::<(), Error>(RaisedError::new(ErrorCategory::Middleware, "flaky").into())
            })
        }))
        .unwrap();

    let mut ctx = MiddlewareContext::new();
    let err = kernel.execute(&mut ctx).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Middleware);

    kernel.recovery().register_strategy(ErrorCategory::Middleware, RecoveryStrategy::Skip);
    assert_eq!(kernel.execute(&mut ctx).await.unwrap(), Outcome::Recovered);
    assert_eq!(kernel.recovery().get_recovery_history().len(), 2);
}

#[tokio::test]
async fn test_resolve_routes_constructor_failures_through_recovery() {
    let kernel = Kernel::new();
    let token: Token<String> = Token::new("remote-config");
    kernel
        .container()
        .register(&token, Lifetime::Transient, &[], |_| {
            Err(RaisedError::new(ErrorCategory::Config, "unreachable").into())
        })
        .unwrap();

    assert!(kernel.resolve(&token).await.is_err());

    kernel.recovery().register_strategy(ErrorCategory::Di, RecoveryStrategy::UseDefault(serde_json::Value::Null));
    assert!(kernel.resolve(&token).await.unwrap().is_none());

    let missing: Token<String> = Token::new("nothing");
    let err = kernel.resolve(&missing).await.unwrap_err();
    assert_eq!(err.code(), "NOT_REGISTERED");
}

#[tokio::test]
async fn test_shutdown_runs_in_reverse() {
    let log = tracker();
    let mut kernel = Kernel::with_config(KernelConfig::default());
    kernel.register_manager(TestManager::new("state", &[], false, &log));
    kernel.register_manager(TestManager::new("events", &["state"], false, &log));
    kernel.bootstrap().await.unwrap();
    kernel.use_plugin(Arc::new(CounterPlugin { tracker: log.clone() })).await.unwrap();
    log.lock().unwrap().clear();

    kernel.shutdown().await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["uninstall:counter", "shutdown:events", "shutdown:state"]
    );
    assert!(!kernel.is_bootstrapped());
}

#[tokio::test]
async fn test_bootstrap_after_shutdown_restarts_managers() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("state", &[], false, &log));

    kernel.bootstrap().await.unwrap();
    kernel.shutdown().await.unwrap();
    assert!(!kernel.managers().is_initialized("state"));
    assert!(kernel.managers().init_order().is_empty());

    kernel.bootstrap().await.unwrap();
    assert!(kernel.managers().is_initialized("state"));
    kernel.shutdown().await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["init:state", "shutdown:state", "init:state", "shutdown:state"]
    );
}

#[tokio::test]
async fn test_repeated_shutdown_does_not_stop_managers_twice() {
    let log = tracker();
    let mut kernel = Kernel::new();
    kernel.register_manager(TestManager::new("state", &[], false, &log));
    kernel.bootstrap().await.unwrap();

    kernel.shutdown().await.unwrap();
    kernel.shutdown().await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["init:state", "shutdown:state"]);
}
