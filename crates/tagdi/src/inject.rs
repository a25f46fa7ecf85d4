//! Self-describing services

use std::sync::Arc;

use crate::container::Container;
use crate::definition::{Factory, Instance};
use crate::error::DIResult;

/// Trait for types that can build themselves from the container
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tagdi::{Container, ContainerBuilder, ContainerExt, DIResult, Injectable};
///
/// struct Greeter {
///     name: Arc<String>,
///     excited: bool,
/// }
///
/// impl Injectable for Greeter {
///     fn inject(container: &dyn Container) -> DIResult<Self> {
///         Ok(Self {
///             name: container.get_as("name")?,
///             excited: container.parameter("greeter.excited")?,
///         })
///     }
/// }
///
/// let builder = ContainerBuilder::new();
/// builder.set_value("name", String::from("world")).unwrap();
/// builder.set_parameter("greeter.excited", true).unwrap();
/// builder.set_injectable::<Greeter>("greeter").unwrap();
///
/// let container = builder.get_container().unwrap();
/// let greeter = container.get_as::<Greeter>("greeter").unwrap();
/// assert_eq!(greeter.name.as_str(), "world");
/// assert!(greeter.excited);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Resolve the dependencies of `Self` and build it
    fn inject(container: &dyn Container) -> DIResult<Self>;
}

/// The canonical factory that builds `T` through [`Injectable::inject`]
pub fn injectable_factory<T: Injectable>() -> Factory {
    Arc::new(|container: &dyn Container| -> DIResult<Instance> {
        let instance: Instance = Arc::new(T::inject(container)?);
        Ok(instance)
    })
}
