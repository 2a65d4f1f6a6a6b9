use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;

use crate::di::error::DiError;
use crate::di::resolver::{AnyInstance, Injected, InstanceMap, Resolver, ScopedStore, downcast};
use crate::di::scope::Scope;
use crate::di::token::{Lifetime, Token};
use crate::graph::DependencyGraph;
use crate::kernel::error::Result;

pub(crate) type Provider = Arc<dyn Fn(&mut Resolver<'_>) -> Result<AnyInstance> + Send + Sync>;

/// A registered service.
pub struct Registration {
    pub token: String,
    pub lifetime: Lifetime,
    pub dependencies: Vec<String>,
    pub(crate) provider: Provider,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("token", &self.token)
            .field("lifetime", &self.lifetime)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Result of [`DiContainer::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Default)]
struct RegistrationTable {
    entries: HashMap<String, Arc<Registration>>,
    order: Vec<String>,
}

#[derive(Default)]
pub(crate) struct ContainerInner {
    registrations: RwLock<RegistrationTable>,
    singletons: Mutex<InstanceMap>,
}

impl ContainerInner {
    pub(crate) fn registration(&self, name: &str) -> Option<Arc<Registration>> {
        let table = self.registrations.read().unwrap_or_else(|e| e.into_inner());
        table.entries.get(name).cloned()
    }

    pub(crate) fn cached_singleton(&self, name: &str) -> Option<AnyInstance> {
        self.singletons.lock().unwrap_or_else(|e| e.into_inner()).get(name).cloned()
    }

    /// Caches `instance` unless another resolution got there first, and
    /// returns whichever instance is cached.
    pub(crate) fn cache_singleton(&self, name: &str, instance: AnyInstance) -> AnyInstance {
        self.singletons
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert(instance)
            .clone()
    }
}

/// Dependency-injection container.
///
/// Cloning is cheap and yields a handle to the same registrations and
/// singleton cache. Registration and resolution take `&self`, so the container
/// can be shared with plugins through a
/// [`PluginContext`](crate::plugin_system::PluginContext).
#[derive(Clone, Default)]
pub struct DiContainer {
    inner: Arc<ContainerInner>,
}

impl fmt::Debug for DiContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiContainer")
            .field("registrations", &self.get_registrations())
            .finish()
    }
}

impl DiContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor. `dependencies` are resolved in order before
    /// `ctor` runs and handed to it as [`Injected`].
    pub fn register<T, F>(&self, token: &Token<T>, lifetime: Lifetime, dependencies: &[&str], ctor: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(Injected) -> Result<T> + Send + Sync + 'static,
    {
        self.register_any(token.name(), lifetime, dependencies, move |injected| {
            let instance: AnyInstance = Arc::new(ctor(injected)?);
            Ok(instance)
        })
    }

    /// String-keyed registration for services whose type is only known at
    /// runtime.
    pub fn register_any<F>(&self, name: &str, lifetime: Lifetime, dependencies: &[&str], ctor: F) -> Result<()>
    where
        F: Fn(Injected) -> Result<AnyInstance> + Send + Sync + 'static,
    {
        let owner = name.to_string();
        let deps: Vec<String> = dependencies.iter().map(|d| d.to_string()).collect();
        let declared = deps.clone();
        let provider: Provider = Arc::new(move |resolver: &mut Resolver<'_>| {
            let mut entries = Vec::with_capacity(deps.len());
            for dep in &deps {
                entries.push((dep.clone(), resolver.resolve_any(dep)?));
            }
            ctor(Injected::new(&owner, entries))
        });
        self.insert(name, lifetime, declared, provider)
    }

    /// Registers a factory that resolves whatever it needs through the
    /// [`Resolver`]. Factory dependencies are invisible to [`validate`](Self::validate).
    pub fn register_factory<T, F>(&self, token: &Token<T>, lifetime: Lifetime, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolver<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let provider: Provider = Arc::new(move |resolver: &mut Resolver<'_>| {
            let instance: AnyInstance = Arc::new(factory(resolver)?);
            Ok(instance)
        });
        self.insert(token.name(), lifetime, Vec::new(), provider)
    }

    /// Registers an existing value. Always resolves to that same instance.
    pub fn register_instance<T: Send + Sync + 'static>(&self, token: &Token<T>, value: T) -> Result<()> {
        self.register_shared(token, Arc::new(value))
    }

    /// Like [`register_instance`](Self::register_instance) for a value the
    /// caller keeps a handle to.
    pub fn register_shared<T: Send + Sync + 'static>(&self, token: &Token<T>, value: Arc<T>) -> Result<()> {
        let instance: AnyInstance = value;
        let provider: Provider = Arc::new(move |_: &mut Resolver<'_>| Ok(instance.clone()));
        self.insert(token.name(), Lifetime::Singleton, Vec::new(), provider)
    }

    fn insert(&self, name: &str, lifetime: Lifetime, dependencies: Vec<String>, provider: Provider) -> Result<()> {
        let mut table = self.inner.registrations.write().unwrap_or_else(|e| e.into_inner());
        if table.entries.contains_key(name) {
            return Err(DiError::AlreadyRegistered { token: name.to_string() }.into());
        }
        log::debug!("Registered {} service '{}' (deps: {:?})", lifetime, name, dependencies);
        table.order.push(name.to_string());
        table.entries.insert(
            name.to_string(),
            Arc::new(Registration {
                token: name.to_string(),
                lifetime,
                dependencies,
                provider,
            }),
        );
        Ok(())
    }

    pub fn resolve<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        let instance = self.resolve_any(token.name())?;
        downcast(token.name(), instance)
    }

    /// Resolves by name. Scoped services resolved here live only for this
    /// call.
    pub fn resolve_any(&self, name: &str) -> Result<AnyInstance> {
        Resolver::new(&self.inner, ScopedStore::Anonymous(InstanceMap::new())).resolve_any(name)
    }

    pub(crate) fn resolve_in(&self, scope_store: &Mutex<InstanceMap>, name: &str) -> Result<AnyInstance> {
        Resolver::new(&self.inner, ScopedStore::Shared(scope_store)).resolve_any(name)
    }

    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    pub fn has(&self, name: &str) -> bool {
        let table = self.inner.registrations.read().unwrap_or_else(|e| e.into_inner());
        table.entries.contains_key(name)
    }

    /// Removes a registration and its cached singleton. Instances already
    /// cached in live scopes are left alone.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = {
            let mut table = self.inner.registrations.write().unwrap_or_else(|e| e.into_inner());
            table.order.retain(|t| t != name);
            table.entries.remove(name).is_some()
        };
        if removed {
            self.inner.singletons.lock().unwrap_or_else(|e| e.into_inner()).remove(name);
            log::debug!("Unregistered service '{}'", name);
        }
        removed
    }

    /// Registered tokens in registration order.
    pub fn get_registrations(&self) -> Vec<String> {
        let table = self.inner.registrations.read().unwrap_or_else(|e| e.into_inner());
        table.order.clone()
    }

    pub fn lifetime_of(&self, name: &str) -> Option<Lifetime> {
        self.inner.registration(name).map(|r| r.lifetime)
    }

    /// Checks declared dependencies without constructing anything: every
    /// dependency must be registered and the declarations must be acyclic.
    pub fn validate(&self) -> DiValidation {
        let mut graph = DependencyGraph::new();
        {
            let table = self.inner.registrations.read().unwrap_or_else(|e| e.into_inner());
            for name in &table.order {
                if let Some(registration) = table.entries.get(name) {
                    let deps: Vec<&str> = registration.dependencies.iter().map(String::as_str).collect();
                    graph.add_node(name, &deps);
                }
            }
        }

        let report = graph.validate();
        DiValidation {
            valid: report.valid,
            errors: report.errors,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.registrations.read().unwrap_or_else(|e| e.into_inner()).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
