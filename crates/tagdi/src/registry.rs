//! The definition registry: key rules, alias rules, tagged lookup and parameters

use std::any::Any;
use std::cmp::Reverse;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::binding::{Binding, Target};
use crate::container::Container;
use crate::definition::{constant, declared_kind, erase, merge_tags, Definition, Factory, Kind};
use crate::error::{DIError, DIResult};
use crate::inject::{injectable_factory, Injectable};
use crate::key_parser::{parse_key, Tags};

/// Definitions and parameters, keyed by bare key, in registration order.
///
/// A replaced key keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: IndexMap<String, Arc<Definition>>,
    parameters: IndexMap<String, serde_json::Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------------

    /// Register a ready-made value; every resolution hands out the same instance
    pub fn set_value<T: Any + Send + Sync>(&mut self, key: &str, value: T) -> DIResult<()> {
        self.set_value_with_tags(key, value, Tags::new())
    }

    pub fn set_value_with_tags<T: Any + Send + Sync>(
        &mut self,
        key: &str,
        value: T,
        tags: Tags,
    ) -> DIResult<()> {
        self.register(key, constant(Arc::new(value)), tags, Kind::Value)
    }

    /// Register a factory producing the service on demand
    pub fn set_factory<F, T>(&mut self, key: &str, factory: F) -> DIResult<()>
    where
        F: Fn(&dyn Container) -> DIResult<Arc<T>> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.set_factory_with_tags(key, factory, Tags::new())
    }

    pub fn set_factory_with_tags<F, T>(&mut self, key: &str, factory: F, tags: Tags) -> DIResult<()>
    where
        F: Fn(&dyn Container) -> DIResult<Arc<T>> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.register(key, erase(factory), tags, Kind::Factory)
    }

    /// Point `key` at the existing concrete definition `target`.
    ///
    /// The alias keeps its own tags, so it may differ from its target in
    /// visibility, sharing and priority.
    pub fn set_alias(&mut self, key: &str, target: &str) -> DIResult<()> {
        self.set_alias_with_tags(key, target, Tags::new())
    }

    pub fn set_alias_with_tags(&mut self, key: &str, target: &str, tags: Tags) -> DIResult<()> {
        let (key, key_tags) = parse_valid_key(key)?;
        let target = target.trim();

        let Some(target_definition) = self.definitions.get(target) else {
            return Err(DIError::AliasTargetNotFound {
                key,
                target: target.to_string(),
            });
        };

        if self.definitions.get(&key).is_some_and(|existing| !existing.is_alias()) {
            return Err(DIError::AliasOverridesDefinition { key });
        }

        if target_definition.is_alias() {
            return Err(DIError::AliasTargetIsAlias {
                key,
                target: target.to_string(),
            });
        }

        let target_definition = Arc::clone(target_definition);
        let tags = merge_tags([&tags, &key_tags, &kind_tag(Kind::Alias)]);
        let definition = Definition::new(key, Arc::clone(target_definition.factory()), tags)?
            .aliasing(target_definition);

        self.insert(definition);
        Ok(())
    }

    /// Register a type that knows how to build itself from the container
    pub fn set_injectable<T: Injectable>(&mut self, key: &str) -> DIResult<()> {
        self.set_injectable_with_tags::<T>(key, Tags::new())
    }

    pub fn set_injectable_with_tags<T: Injectable>(&mut self, key: &str, tags: Tags) -> DIResult<()> {
        self.register(key, injectable_factory::<T>(), tags, Kind::Inject)
    }

    /// Register a batch of bindings, stopping at the first failure
    pub fn set_all(&mut self, bindings: impl IntoIterator<Item = Binding>) -> DIResult<()> {
        for binding in bindings {
            let (key, key_tags) = parse_valid_key(&binding.key)?;
            let tags = merge_tags([&binding.tags, &key_tags]);
            let bound = binding.target.kind();

            if let Some(declared) = declared_kind(&key, &tags)? {
                if declared != bound {
                    return Err(DIError::KindMismatch {
                        key,
                        declared,
                        bound,
                    });
                }
            }

            match binding.target {
                Target::Value(instance) => self.register(&key, constant(instance), tags, bound)?,
                Target::Factory(factory) | Target::Inject(factory) => {
                    self.register(&key, factory, tags, bound)?
                }
                Target::Alias(target) => self.set_alias_with_tags(&key, &target, tags)?,
            }
        }

        Ok(())
    }

    pub fn has_definition(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    pub fn get_definition(&self, key: &str) -> DIResult<Arc<Definition>> {
        self.definitions
            .get(key)
            .cloned()
            .ok_or_else(|| DIError::NotFound {
                key: key.to_string(),
            })
    }

    /// All definitions in registration order
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<Definition>> {
        self.definitions.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Keys of the definitions carrying `tag`, highest priority first.
    ///
    /// A non-empty `values` keeps only definitions whose tag value is one of them.
    /// Equal priorities keep registration order.
    pub fn get_tagged_keys(&self, tag: &str, values: &[&str]) -> Vec<String> {
        let mut matched: Vec<&Arc<Definition>> = self
            .definitions
            .values()
            .filter(|definition| match definition.tag(tag) {
                Some(value) => values.is_empty() || values.contains(&value),
                None => false,
            })
            .collect();

        matched.sort_by_key(|definition| Reverse(definition.priority()));

        matched
            .into_iter()
            .map(|definition| definition.key().to_string())
            .collect()
    }

    // ------------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------------

    /// Store a parameter. Tags on the key are dropped.
    pub fn set_parameter<T: Serialize>(&mut self, key: &str, value: T) -> DIResult<()> {
        let (key, _) = parse_valid_key(key)?;

        let value = serde_json::to_value(value).map_err(|e| DIError::InvalidParameter {
            key: key.clone(),
            message: e.to_string(),
        })?;

        debug!(key = %key, "Registered parameter");
        self.parameters.insert(key, value);
        Ok(())
    }

    pub fn has_parameter(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn get_parameter(&self, key: &str) -> DIResult<&serde_json::Value> {
        self.parameters
            .get(key)
            .ok_or_else(|| DIError::ParameterNotFound {
                key: key.to_string(),
            })
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.parameters.iter().map(|(key, value)| (key.as_str(), value))
    }

    fn register(&mut self, key: &str, factory: Factory, tags: Tags, kind: Kind) -> DIResult<()> {
        let (key, key_tags) = parse_valid_key(key)?;
        let tags = merge_tags([&tags, &key_tags, &kind_tag(kind)]);
        let definition = Definition::new(key, factory, tags)?;

        self.insert(definition);
        Ok(())
    }

    fn insert(&mut self, definition: Definition) {
        debug!(
            key = definition.key(),
            kind = %definition.kind(),
            shared = definition.is_shared(),
            private = definition.is_private(),
            priority = definition.priority(),
            alias_of = definition.alias_of().map(|target| target.key()),
            "Registered service definition"
        );

        self.definitions
            .insert(definition.key().to_string(), Arc::new(definition));
    }
}

fn parse_valid_key(raw: &str) -> DIResult<(String, Tags)> {
    let (key, tags) = parse_key(raw);
    if key.is_empty() {
        return Err(DIError::InvalidKey {
            raw: raw.to_string(),
        });
    }
    Ok((key, tags))
}

fn kind_tag(kind: Kind) -> Tags {
    Tags::from([(kind.as_tag().to_string(), String::new())])
}
