//! The configuration-phase handle and its sealing protocol

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::binding::Binding;
use crate::container::{Container, ServiceContainer};
use crate::definition::Definition;
use crate::error::{DIError, DIResult};
use crate::inject::Injectable;
use crate::key_parser::Tags;
use crate::provider::{Provider, Resolver};
use crate::registry::Registry;

/// Everything collected while the builder is open
#[derive(Default)]
struct Pending {
    registry: Registry,
    providers: Vec<Box<dyn Provider>>,
    resolvers: Vec<Box<dyn Resolver>>,
}

impl Pending {
    /// Run every hook against a copy of the registry, leaving `self` untouched
    fn seal(&self) -> DIResult<Registry> {
        let mut registry = self.registry.clone();

        for provider in &self.providers {
            debug!(provider = provider.name(), "Running provider");
            provider.provide(&mut registry)?;
        }

        for resolver in &self.resolvers {
            debug!(resolver = resolver.name(), "Running resolver");
            resolver.resolve(&mut registry)?;
        }

        Ok(registry)
    }
}

enum Lifecycle {
    Open(Pending),
    Sealed(Arc<Registry>),
}

/// Collects definitions, parameters and hooks, then seals them into sessions.
///
/// The first successful [`get_container`](Self::get_container) runs every provider,
/// then every resolver, and freezes the registry. Any later mutation fails with
/// [`DIError::RegistrySealed`].
pub struct ContainerBuilder {
    lifecycle: Mutex<Lifecycle>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::from_registry(Registry::new())
    }

    /// Start from an already populated registry
    pub fn from_registry(registry: Registry) -> Self {
        Self {
            lifecycle: Mutex::new(Lifecycle::Open(Pending {
                registry,
                ..Pending::default()
            })),
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Sealed(_))
    }

    /// Mutate the registry directly while the builder is still open
    pub fn configure<R>(&self, f: impl FnOnce(&mut Registry) -> DIResult<R>) -> DIResult<R> {
        self.with_pending(|pending| f(&mut pending.registry))
    }

    pub fn add_provider(&self, provider: impl Provider + 'static) -> DIResult<()> {
        self.with_pending(|pending| {
            pending.providers.push(Box::new(provider));
            Ok(())
        })
    }

    pub fn add_resolver(&self, resolver: impl Resolver + 'static) -> DIResult<()> {
        self.with_pending(|pending| {
            pending.resolvers.push(Box::new(resolver));
            Ok(())
        })
    }

    // ------------------------------------------------------------------------
    // Registry forwarders
    // ------------------------------------------------------------------------

    pub fn set_value<T: Any + Send + Sync>(&self, key: &str, value: T) -> DIResult<()> {
        self.configure(|registry| registry.set_value(key, value))
    }

    pub fn set_value_with_tags<T: Any + Send + Sync>(
        &self,
        key: &str,
        value: T,
        tags: Tags,
    ) -> DIResult<()> {
        self.configure(|registry| registry.set_value_with_tags(key, value, tags))
    }

    pub fn set_factory<F, T>(&self, key: &str, factory: F) -> DIResult<()>
    where
        F: Fn(&dyn Container) -> DIResult<Arc<T>> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.configure(|registry| registry.set_factory(key, factory))
    }

    pub fn set_factory_with_tags<F, T>(&self, key: &str, factory: F, tags: Tags) -> DIResult<()>
    where
        F: Fn(&dyn Container) -> DIResult<Arc<T>> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.configure(|registry| registry.set_factory_with_tags(key, factory, tags))
    }

    pub fn set_alias(&self, key: &str, target: &str) -> DIResult<()> {
        self.configure(|registry| registry.set_alias(key, target))
    }

    pub fn set_alias_with_tags(&self, key: &str, target: &str, tags: Tags) -> DIResult<()> {
        self.configure(|registry| registry.set_alias_with_tags(key, target, tags))
    }

    pub fn set_injectable<T: Injectable>(&self, key: &str) -> DIResult<()> {
        self.configure(|registry| registry.set_injectable::<T>(key))
    }

    pub fn set_injectable_with_tags<T: Injectable>(&self, key: &str, tags: Tags) -> DIResult<()> {
        self.configure(|registry| registry.set_injectable_with_tags::<T>(key, tags))
    }

    pub fn set_all(&self, bindings: impl IntoIterator<Item = Binding>) -> DIResult<()> {
        self.configure(|registry| registry.set_all(bindings))
    }

    pub fn set_parameter<T: Serialize>(&self, key: &str, value: T) -> DIResult<()> {
        self.configure(|registry| registry.set_parameter(key, value))
    }

    pub fn has_definition(&self, key: &str) -> bool {
        self.with_registry(|registry| registry.has_definition(key))
    }

    pub fn get_definition(&self, key: &str) -> DIResult<Arc<Definition>> {
        self.with_registry(|registry| registry.get_definition(key))
    }

    pub fn has_parameter(&self, key: &str) -> bool {
        self.with_registry(|registry| registry.has_parameter(key))
    }

    pub fn get_parameter(&self, key: &str) -> DIResult<serde_json::Value> {
        self.with_registry(|registry| registry.get_parameter(key).cloned())
    }

    pub fn get_tagged_keys(&self, tag: &str, values: &[&str]) -> Vec<String> {
        self.with_registry(|registry| registry.get_tagged_keys(tag, values))
    }

    // ------------------------------------------------------------------------
    // Sealing
    // ------------------------------------------------------------------------

    /// Seal on first use, then hand out a fresh session with an empty cache.
    ///
    /// If a provider or resolver fails the error is returned and the builder stays
    /// open exactly as it was, so the call can be retried after fixing the cause.
    pub fn get_container(&self) -> DIResult<ServiceContainer> {
        let mut lifecycle = self.lifecycle.lock();

        let registry = match &*lifecycle {
            Lifecycle::Sealed(registry) => return Ok(ServiceContainer::new(Arc::clone(registry))),
            Lifecycle::Open(pending) => {
                info!(
                    definitions = pending.registry.len(),
                    providers = pending.providers.len(),
                    resolvers = pending.resolvers.len(),
                    "Sealing container registry"
                );

                match pending.seal() {
                    Ok(registry) => Arc::new(registry),
                    Err(e) => {
                        warn!(error = %e, "Sealing failed, registry left open");
                        return Err(e);
                    }
                }
            }
        };

        *lifecycle = Lifecycle::Sealed(Arc::clone(&registry));
        info!(definitions = registry.len(), "Container registry sealed");

        Ok(ServiceContainer::new(registry))
    }

    fn with_pending<R>(&self, f: impl FnOnce(&mut Pending) -> DIResult<R>) -> DIResult<R> {
        match &mut *self.lifecycle.lock() {
            Lifecycle::Open(pending) => f(pending),
            Lifecycle::Sealed(_) => Err(DIError::RegistrySealed),
        }
    }

    fn with_registry<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        match &*self.lifecycle.lock() {
            Lifecycle::Open(pending) => f(&pending.registry),
            Lifecycle::Sealed(registry) => f(registry),
        }
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
