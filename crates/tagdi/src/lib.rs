//! Tag-driven service registry and lazy resolution container
//!
//! Services are registered under keys that carry tags (`"logger #shared #priority=2"`).
//! A [`ContainerBuilder`] collects definitions, parameters and hooks; the first call to
//! [`ContainerBuilder::get_container`] seals it and every call hands out a fresh
//! [`ServiceContainer`] session that builds services lazily, detects circular
//! dependencies and caches shared instances.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tagdi::{ContainerBuilder, ContainerExt};
//!
//! let builder = ContainerBuilder::new();
//! builder.set_value("name", String::from("tagdi")).unwrap();
//! builder
//!     .set_factory("greeting #shared", |c| {
//!         Ok(Arc::new(format!("hello {}", c.get_as::<String>("name")?)))
//!     })
//!     .unwrap();
//!
//! let container = builder.get_container().unwrap();
//! assert_eq!(container.get_as::<String>("greeting").unwrap().as_str(), "hello tagdi");
//! ```
//!
//! See [`usage`] module for detailed usage examples.

pub mod binding;
pub mod builder;
pub mod config;
pub mod container;
pub mod definition;
pub mod error;
pub mod inject;
pub mod key_parser;
pub mod provider;
pub mod registry;
pub mod usage;

pub use binding::{Binding, Target};
pub use builder::ContainerBuilder;
pub use config::{ConfigProvider, ConfigResolver, ContainerConfig};
pub use container::{Container, ContainerExt, ServiceContainer};
pub use definition::{merge_tags, Definition, Factory, Instance, Kind};
pub use error::{DIError, DIResult, ErrorKind};
pub use inject::{injectable_factory, Injectable};
pub use key_parser::{parse_key, Tags};
pub use provider::{Provider, ProviderFn, Resolver, ResolverFn};
pub use registry::Registry;

/// Build a [`Tags`] map inline.
///
/// A bare name is a presence tag with an empty value; `name = value` stores the
/// value's `to_string()`.
///
/// ```rust
/// let tags = tagdi::tags! { "shared", "priority" = 2 };
/// assert_eq!(tags["shared"], "");
/// assert_eq!(tags["priority"], "2");
/// ```
#[macro_export]
macro_rules! tags {
    () => {
        $crate::Tags::new()
    };
    ($($name:literal $(= $value:expr)?),+ $(,)?) => {{
        let mut tags = $crate::Tags::new();
        $(
            tags.insert(
                ::std::string::String::from($name),
                ::std::string::String::new() $(+ &::std::string::ToString::to_string(&$value))?,
            );
        )+
        tags
    }};
}

/// Commonly used items
pub mod prelude {
    pub use crate::{
        tags, Binding, Container, ContainerBuilder, ContainerExt, DIError, DIResult,
        Injectable, Registry, ServiceContainer, Target,
    };
}
