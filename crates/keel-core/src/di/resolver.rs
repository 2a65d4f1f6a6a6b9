use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::di::container::ContainerInner;
use crate::di::error::DiError;
use crate::di::token::{Lifetime, Token};
use crate::kernel::error::{Error, Result};

/// A type-erased service instance.
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

pub(crate) type InstanceMap = HashMap<String, AnyInstance>;

/// Where scoped instances are cached for one resolution.
pub(crate) enum ScopedStore<'a> {
    /// A [`Scope`](crate::di::Scope)'s cache, shared between resolutions.
    Shared(&'a Mutex<InstanceMap>),
    /// Resolution on the root container; lives as long as the resolver.
    Anonymous(InstanceMap),
}

/// Carries the resolution stack of a single top-level `resolve` call.
///
/// Factories registered with
/// [`register_factory`](crate::di::DiContainer::register_factory) receive the
/// resolver so they can pull dependencies conditionally; anything resolved
/// through it takes part in cycle detection.
pub struct Resolver<'a> {
    inner: &'a ContainerInner,
    scoped: ScopedStore<'a>,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(inner: &'a ContainerInner, scoped: ScopedStore<'a>) -> Self {
        Self {
            inner,
            scoped,
            stack: Vec::new(),
        }
    }

    pub fn resolve<T: Send + Sync + 'static>(&mut self, token: &Token<T>) -> Result<Arc<T>> {
        let instance = self.resolve_any(token.name())?;
        downcast(token.name(), instance)
    }

    /// Resolves by name. Fails with [`DiError::CircularDependency`] if the name
    /// is already being constructed further up this resolution.
    pub fn resolve_any(&mut self, name: &str) -> Result<AnyInstance> {
        if let Some(start) = self.stack.iter().position(|t| t == name) {
            let mut path = self.stack[start..].to_vec();
            path.push(name.to_string());
            return Err(DiError::CircularDependency {
                token: name.to_string(),
                path,
            }
            .into());
        }

        let registration = self
            .inner
            .registration(name)
            .ok_or_else(|| DiError::NotRegistered { token: name.to_string() })?;

        match registration.lifetime {
            Lifetime::Singleton => {
                if let Some(instance) = self.inner.cached_singleton(name) {
                    return Ok(instance);
                }
            }
            Lifetime::Scoped => {
                if let Some(instance) = self.cached_scoped(name) {
                    return Ok(instance);
                }
            }
            Lifetime::Transient => {}
        }

        log::trace!("Constructing {} service '{}'", registration.lifetime, name);
        self.stack.push(name.to_string());
        let built = (registration.provider)(self);
        self.stack.pop();

        let instance = built.map_err(|err| match err {
            Error::Di(_) => err,
            other => DiError::ConstructionFailed {
                token: name.to_string(),
                source: Box::new(other),
            }
            .into(),
        })?;

        Ok(match registration.lifetime {
            Lifetime::Singleton => self.inner.cache_singleton(name, instance),
            Lifetime::Scoped => self.cache_scoped(name, instance),
            Lifetime::Transient => instance,
        })
    }

    /// Tokens currently under construction, outermost first.
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    fn cached_scoped(&self, name: &str) -> Option<AnyInstance> {
        match &self.scoped {
            ScopedStore::Shared(store) => store.lock().unwrap_or_else(|e| e.into_inner()).get(name).cloned(),
            ScopedStore::Anonymous(store) => store.get(name).cloned(),
        }
    }

    fn cache_scoped(&mut self, name: &str, instance: AnyInstance) -> AnyInstance {
        match &mut self.scoped {
            ScopedStore::Shared(store) => store
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .entry(name.to_string())
                .or_insert(instance)
                .clone(),
            ScopedStore::Anonymous(store) => store.entry(name.to_string()).or_insert(instance).clone(),
        }
    }
}

pub(crate) fn downcast<T: Send + Sync + 'static>(name: &str, instance: AnyInstance) -> Result<Arc<T>> {
    Arc::downcast::<T>(instance).map_err(|_| {
        DiError::TypeMismatch {
            token: name.to_string(),
            expected: type_name::<T>(),
        }
        .into()
    })
}

/// Dependencies resolved for a constructor registered with
/// [`register`](crate::di::DiContainer::register), in declared order.
pub struct Injected {
    owner: String,
    entries: Vec<(String, AnyInstance)>,
}

impl Injected {
    pub(crate) fn new(owner: &str, entries: Vec<(String, AnyInstance)>) -> Self {
        Self {
            owner: owner.to_string(),
            entries,
        }
    }

    /// Dependency at declared position `index`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>> {
        let (name, instance) = self.entries.get(index).ok_or_else(|| DiError::InjectionMissing {
            owner: self.owner.clone(),
            dependency: format!("#{}", index),
        })?;
        downcast(name, instance.clone())
    }

    pub fn by_name<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        let instance = self.any(name).ok_or_else(|| DiError::InjectionMissing {
            owner: self.owner.clone(),
            dependency: name.to_string(),
        })?;
        downcast(name, instance)
    }

    pub fn by_token<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        self.by_name(token.name())
    }

    pub fn any(&self, name: &str) -> Option<AnyInstance> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, i)| i.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
