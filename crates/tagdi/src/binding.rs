//! Batch registration records for [`Registry::set_all`](crate::Registry::set_all)

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::definition::{erase, Factory, Instance, Kind};
use crate::error::DIResult;
use crate::inject::{injectable_factory, Injectable};
use crate::key_parser::Tags;

/// What a binding resolves to
#[derive(Clone)]
pub enum Target {
    Value(Instance),
    Factory(Factory),
    Alias(String),
    Inject(Factory),
}

impl Target {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Target::Value(Arc::new(value))
    }

    pub fn factory<F, T>(factory: F) -> Self
    where
        F: Fn(&dyn Container) -> DIResult<Arc<T>> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Target::Factory(erase(factory))
    }

    pub fn alias(target: impl Into<String>) -> Self {
        Target::Alias(target.into())
    }

    pub fn inject<T: Injectable>() -> Self {
        Target::Inject(injectable_factory::<T>())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Target::Value(_) => Kind::Value,
            Target::Factory(_) => Kind::Factory,
            Target::Alias(_) => Kind::Alias,
            Target::Inject(_) => Kind::Inject,
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// One entry of a batch registration. Explicit `tags` win over tags embedded in `key`.
#[derive(Debug, Clone)]
pub struct Binding {
    pub key: String,
    pub target: Target,
    pub tags: Tags,
}

impl Binding {
    pub fn new(key: impl Into<String>, target: Target) -> Self {
        Self {
            key: key.into(),
            target,
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kind() {
        assert_eq!(Target::value(1_i32).kind(), Kind::Value);
        assert_eq!(Target::factory(|_| Ok(Arc::new(1_i32))).kind(), Kind::Factory);
        assert_eq!(Target::alias("other").kind(), Kind::Alias);
    }

    #[test]
    fn test_binding_builder() {
        let binding = Binding::new("k #a=1", Target::value("v"))
            .with_tag("b", "2")
            .with_tag("a", "3");

        assert_eq!(binding.key, "k #a=1");
        assert_eq!(binding.tags.get("a").map(String::as_str), Some("3"));
        assert_eq!(format!("{:?}", binding.target), "value");
    }
}
