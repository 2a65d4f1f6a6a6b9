use std::sync::Arc;

use core_logging::{LOGGER, Logger, LoggingPlugin, RequestLogMiddleware, init_subscriber};
use keel_core::middleware::middleware_fn;
use keel_core::plugin_system::PluginSystemError;
use keel_core::{Kernel, KernelConfig, KernelError, MiddlewareContext, Outcome};

fn config_with_settings(settings: serde_json::Value) -> KernelConfig {
    let mut config = KernelConfig::default();
    config.plugins.insert(LoggingPlugin::NAME.to_string(), settings);
    config
}

#[tokio::test]
async fn test_install_registers_logger_and_middleware() {
    let mut kernel = Kernel::new();
    let outcome = kernel.use_plugin(Arc::new(LoggingPlugin)).await.unwrap();

    assert_eq!(outcome, Outcome::Completed);
    assert!(kernel.plugins().has(LoggingPlugin::NAME));
    assert_eq!(kernel.pipeline().names(), vec![RequestLogMiddleware::NAME.to_string()]);

    let logger = kernel.resolve(&LOGGER).await.unwrap().expect("logger registered");
    assert_eq!(logger.scope(), "keel");
}

#[tokio::test]
async fn test_request_log_can_be_disabled() {
    let config = config_with_settings(serde_json::json!({ "request_log": false }));
    let mut kernel = Kernel::with_config(config);
    kernel.use_plugin(Arc::new(LoggingPlugin)).await.unwrap();

    assert!(kernel.pipeline().is_empty());
    assert!(kernel.container().has(LOGGER.name()));
}

#[tokio::test]
async fn test_request_log_wraps_the_whole_run() {
    let mut kernel = Kernel::new();
    kernel.use_plugin(Arc::new(LoggingPlugin)).await.unwrap();
    kernel
        .pipeline()
        .use_middleware(middleware_fn("handler", 0, |ctx, next| {
            Box::pin(async move {
                ctx.set_data("handled", true);
                next.run(ctx).await
            })
        }))
        .unwrap();

    let mut ctx = MiddlewareContext::new();
    ctx.set_metadata("request_id", "req-1");
    let outcome = kernel.execute(&mut ctx).await.unwrap();

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(ctx.trail(), ["request-log", "handler"]);
    assert_eq!(ctx.get_data::<bool>("handled"), Some(&true));
    assert!(ctx.metadata("elapsed_ms").is_some());
}

#[tokio::test]
async fn test_uninstall_removes_registrations_and_allows_reinstall() {
    let mut kernel = Kernel::new();
    kernel.use_plugin(Arc::new(LoggingPlugin)).await.unwrap();

    kernel.uninstall_plugin(LoggingPlugin::NAME).await.unwrap();
    assert!(!kernel.plugins().has(LoggingPlugin::NAME));
    assert!(kernel.pipeline().is_empty());
    assert!(!kernel.container().has(LOGGER.name()));

    kernel.use_plugin(Arc::new(LoggingPlugin)).await.unwrap();
    assert!(kernel.plugins().has(LoggingPlugin::NAME));
}

#[tokio::test]
async fn test_invalid_level_fails_install() {
    let config = config_with_settings(serde_json::json!({ "level": "keel=loud" }));
    let mut kernel = Kernel::with_config(config);

    let err = kernel.use_plugin(Arc::new(LoggingPlugin)).await.unwrap_err();

    assert!(matches!(
        err,
        KernelError::PluginSystem(PluginSystemError::InstallFailed { .. })
    ));
    assert!(!kernel.plugins().has(LoggingPlugin::NAME));
    assert!(!kernel.container().has(LOGGER.name()));
}

#[test]
fn test_second_subscriber_is_not_installed() {
    init_subscriber("info", false).unwrap();
    assert!(!init_subscriber("debug", true).unwrap());
}

#[test]
fn test_scoped_logger_names() {
    let logger = Logger::new("keel");
    let child = logger.scoped("storage");

    assert_eq!(child.scope(), "keel.storage");
    child.info("scoped event");
}
