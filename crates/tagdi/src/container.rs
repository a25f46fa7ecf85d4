//! Resolution sessions over a sealed registry
//!
//! A [`ServiceContainer`] is what [`ContainerBuilder::get_container`] hands out.
//! Public callers see it sealed: private definitions are rejected. Factories see an
//! unsealed view of the same session, which shares the instance cache and carries
//! the chain of keys currently under construction for cycle detection.
//!
//! [`ContainerBuilder::get_container`]: crate::ContainerBuilder::get_container

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use serde::de::DeserializeOwned;
use tracing::{info, trace, warn};

use crate::definition::{Definition, Instance};
use crate::error::{DIError, DIResult};
use crate::registry::Registry;

/// Resolution surface seen by callers and by factories
pub trait Container {
    /// Resolve the service registered under `key`
    fn get(&self, key: &str) -> DIResult<Instance>;

    /// Resolve every service tagged with `tag`, highest priority first.
    ///
    /// When `values` is not empty only services whose tag value matches one of
    /// them are returned.
    fn get_tagged_by(&self, tag: &str, values: &[&str]) -> DIResult<Vec<Instance>>;

    /// Read a configuration parameter
    fn get_parameter(&self, key: &str) -> DIResult<serde_json::Value>;
}

/// Typed helpers on top of [`Container`]
pub trait ContainerExt: Container {
    fn get_as<T: Any + Send + Sync>(&self, key: &str) -> DIResult<Arc<T>> {
        downcast(key, self.get(key)?)
    }

    fn get_tagged_as<T: Any + Send + Sync>(
        &self,
        tag: &str,
        values: &[&str],
    ) -> DIResult<Vec<Arc<T>>> {
        let label = format!("#{tag}");
        self.get_tagged_by(tag, values)?
            .into_iter()
            .map(|instance| downcast(&label, instance))
            .collect()
    }

    fn parameter<T: DeserializeOwned>(&self, key: &str) -> DIResult<T> {
        serde_json::from_value(self.get_parameter(key)?).map_err(|e| {
            DIError::ParameterTypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                message: e.to_string(),
            }
        })
    }
}

impl<C: Container + ?Sized> ContainerExt for C {}

fn downcast<T: Any + Send + Sync>(key: &str, instance: Instance) -> DIResult<Arc<T>> {
    instance.downcast::<T>().map_err(|_| DIError::TypeMismatch {
        key: key.to_string(),
        expected: type_name::<T>(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Sealed,
    Unsealed,
}

/// One link of the construction chain, living on the stack of the call that
/// pushed it
struct Frame<'a> {
    key: &'a str,
    parent: Option<&'a Frame<'a>>,
}

impl Frame<'_> {
    fn contains(&self, key: &str) -> bool {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.key == key {
                return true;
            }
            frame = current.parent;
        }
        false
    }

    fn origin(&self) -> &str {
        let mut frame = self;
        while let Some(parent) = frame.parent {
            frame = parent;
        }
        frame.key
    }
}

/// One resolution session: a sealed registry plus its own shared-instance cache
pub struct ServiceContainer {
    registry: Arc<Registry>,
    instances: ReentrantMutex<RefCell<HashMap<String, Instance>>>,
}

impl ServiceContainer {
    pub(crate) fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            instances: ReentrantMutex::new(RefCell::new(HashMap::new())),
        }
    }

    /// The sealed registry this session resolves against
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of shared instances cached so far
    pub fn instance_count(&self) -> usize {
        self.instances.lock().borrow().len()
    }

    /// Build every public service once to surface construction failures early.
    ///
    /// With `dry` set the instance cache is emptied afterwards, whatever the outcome.
    pub fn must_build(&self, dry: bool) -> DIResult<()> {
        info!(
            definitions = self.registry.len(),
            dry, "Building all public services"
        );

        let result = self
            .registry
            .definitions()
            .filter(|definition| !definition.is_private())
            .try_for_each(|definition| self.get(definition.key()).map(drop));

        if dry {
            self.instances.lock().borrow_mut().clear();
        }

        result
    }

    fn resolve(
        &self,
        key: &str,
        visibility: Visibility,
        chain: Option<&Frame<'_>>,
    ) -> DIResult<Instance> {
        let definition = self.registry.get_definition(key)?;

        if visibility == Visibility::Sealed && definition.is_private() {
            return Err(DIError::PrivateService {
                key: key.to_string(),
            });
        }

        if !definition.is_shared() {
            return self.construct(&definition, key, chain);
        }

        // Held across construction: shared services of one session are built one at
        // a time. Reentrant so a factory may pull other shared services.
        let guard = self.instances.lock();

        let cached = guard.borrow().get(key).cloned();
        if let Some(instance) = cached {
            trace!(key, "Shared instance cache hit");
            return Ok(instance);
        }

        let instance = self.construct(&definition, key, chain)?;
        guard
            .borrow_mut()
            .insert(key.to_string(), Arc::clone(&instance));

        Ok(instance)
    }

    fn resolve_tagged(
        &self,
        tag: &str,
        values: &[&str],
        visibility: Visibility,
        chain: Option<&Frame<'_>>,
    ) -> DIResult<Vec<Instance>> {
        self.registry
            .get_tagged_keys(tag, values)
            .iter()
            .map(|key| self.resolve(key, visibility, chain))
            .collect()
    }

    fn construct(
        &self,
        definition: &Definition,
        key: &str,
        chain: Option<&Frame<'_>>,
    ) -> DIResult<Instance> {
        if let Some(frame) = chain {
            if frame.contains(key) {
                let origin = frame.origin().to_string();
                warn!(origin = %origin, at = frame.key, "Circular reference detected");
                return Err(DIError::CircularReference {
                    origin,
                    at: frame.key.to_string(),
                });
            }
        }

        trace!(key, kind = %definition.kind(), "Constructing service");

        let frame = Frame { key, parent: chain };
        let view = Unsealed {
            container: self,
            frame: &frame,
        };

        definition.build(&view)
    }
}

impl Container for ServiceContainer {
    fn get(&self, key: &str) -> DIResult<Instance> {
        self.resolve(key, Visibility::Sealed, None)
    }

    fn get_tagged_by(&self, tag: &str, values: &[&str]) -> DIResult<Vec<Instance>> {
        self.resolve_tagged(tag, values, Visibility::Sealed, None)
    }

    fn get_parameter(&self, key: &str) -> DIResult<serde_json::Value> {
        self.registry.get_parameter(key).cloned()
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("definitions", &self.registry.len())
            .field("instances", &self.instance_count())
            .finish()
    }
}

/// The view handed to factories: private services are reachable and every
/// nested request extends the construction chain
struct Unsealed<'a> {
    container: &'a ServiceContainer,
    frame: &'a Frame<'a>,
}

impl Container for Unsealed<'_> {
    fn get(&self, key: &str) -> DIResult<Instance> {
        self.container
            .resolve(key, Visibility::Unsealed, Some(self.frame))
    }

    fn get_tagged_by(&self, tag: &str, values: &[&str]) -> DIResult<Vec<Instance>> {
        self.container
            .resolve_tagged(tag, values, Visibility::Unsealed, Some(self.frame))
    }

    fn get_parameter(&self, key: &str) -> DIResult<serde_json::Value> {
        self.container.get_parameter(key)
    }
}
