use std::sync::Arc;

use async_trait::async_trait;

use super::Host;
use crate::kernel::error::Result;
use crate::manager::Manager;

#[derive(Debug)]
struct StateManager;

#[async_trait]
impl Manager for StateManager {
    fn name(&self) -> &str {
        "state"
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_only_initialized_managers_are_visible() {
    let mut host = Host::default();
    let manager: Arc<dyn Manager> = Arc::new(StateManager);
    host.components.register(manager.clone());
    host.managers.register_manager(manager.as_ref());

    assert!(host.context().manager("state").is_none());
    assert!(host.context().manager_of::<StateManager>().is_none());

    host.managers.mark_initialized("state", None).unwrap();

    let context = host.context();
    assert_eq!(context.manager("state").map(|m| m.name().to_string()), Some("state".to_string()));
    assert!(context.manager_of::<StateManager>().is_some());
    assert!(context.manager("events").is_none());
}

#[test]
fn test_context_exposes_collaborators() {
    let host = Host::default();
    let context = host.context();

    assert_eq!(context.config().recovery.history_limit, 100);
    assert!(context.pipeline().is_empty());
    assert!(context.container().is_empty());
    assert!(context.recovery().get_recovery_history().is_empty());
}
