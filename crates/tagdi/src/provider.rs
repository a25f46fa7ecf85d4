//! Provider and resolver hooks run while a builder is sealed
//!
//! Providers contribute definitions and parameters; resolvers run after every
//! provider and may inspect or adjust the complete registry.
//!
//! ## Usage
//!
//! ```rust
//! use tagdi::{ContainerBuilder, ContainerExt, DIResult, Provider, Registry, ResolverFn};
//!
//! struct StorageProvider;
//!
//! impl Provider for StorageProvider {
//!     fn name(&self) -> &str {
//!         "storage"
//!     }
//!
//!     fn provide(&self, registry: &mut Registry) -> DIResult<()> {
//!         registry.set_value("storage.path #shared", String::from("/tmp/data"))
//!     }
//! }
//!
//! let builder = ContainerBuilder::new();
//! builder.add_provider(StorageProvider).unwrap();
//! builder
//!     .add_resolver(ResolverFn::new("storage-alias", |registry: &mut Registry| {
//!         registry.set_alias("path", "storage.path")
//!     }))
//!     .unwrap();
//!
//! let container = builder.get_container().unwrap();
//! assert_eq!(container.get_as::<String>("path").unwrap().as_str(), "/tmp/data");
//! ```

use std::fmt;

use crate::error::DIResult;
use crate::registry::Registry;

// ============================================================================
// Hook traits
// ============================================================================

/// Contributes definitions to the registry while it is being sealed
pub trait Provider: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn provide(&self, registry: &mut Registry) -> DIResult<()>;
}

/// Runs after every provider, against the complete registry
pub trait Resolver: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn resolve(&self, registry: &mut Registry) -> DIResult<()>;
}

// ============================================================================
// Closure adapters
// ============================================================================

/// A [`Provider`] backed by a closure
pub struct ProviderFn<F> {
    name: String,
    hook: F,
}

impl<F> ProviderFn<F>
where
    F: Fn(&mut Registry) -> DIResult<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, hook: F) -> Self {
        Self {
            name: name.into(),
            hook,
        }
    }
}

impl<F> Provider for ProviderFn<F>
where
    F: Fn(&mut Registry) -> DIResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, registry: &mut Registry) -> DIResult<()> {
        (self.hook)(registry)
    }
}

impl<F> fmt::Debug for ProviderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFn").field("name", &self.name).finish()
    }
}

/// A [`Resolver`] backed by a closure
pub struct ResolverFn<F> {
    name: String,
    hook: F,
}

impl<F> ResolverFn<F>
where
    F: Fn(&mut Registry) -> DIResult<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, hook: F) -> Self {
        Self {
            name: name.into(),
            hook,
        }
    }
}

impl<F> Resolver for ResolverFn<F>
where
    F: Fn(&mut Registry) -> DIResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, registry: &mut Registry) -> DIResult<()> {
        (self.hook)(registry)
    }
}

impl<F> fmt::Debug for ResolverFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverFn").field("name", &self.name).finish()
    }
}
