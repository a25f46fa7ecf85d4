//! Service definitions and the rules that derive their flags from tags

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{DIError, DIResult};
use crate::key_parser::Tags;

pub const TAG_SHARED: &str = "shared";
pub const TAG_PRIVATE: &str = "private";
pub const TAG_PRIORITY: &str = "priority";
pub const TAG_FACTORY: &str = "factory";
pub const TAG_VALUE: &str = "value";
pub const TAG_ALIAS: &str = "alias";
pub const TAG_INJECT: &str = "inject";

/// Kind tags in the order they are scanned. At most one may be present.
pub const KIND_TAGS: [&str; 4] = [TAG_FACTORY, TAG_VALUE, TAG_ALIAS, TAG_INJECT];

/// A constructed, type-erased service instance
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Canonical factory signature shared by every definition kind
pub type Factory = Arc<dyn Fn(&dyn Container) -> DIResult<Instance> + Send + Sync>;

/// How a definition's factory was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Factory,
    Value,
    Alias,
    Inject,
}

impl Kind {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Kind::Factory => TAG_FACTORY,
            Kind::Value => TAG_VALUE,
            Kind::Alias => TAG_ALIAS,
            Kind::Inject => TAG_INJECT,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TAG_FACTORY => Some(Kind::Factory),
            TAG_VALUE => Some(Kind::Value),
            TAG_ALIAS => Some(Kind::Alias),
            TAG_INJECT => Some(Kind::Inject),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A validated service definition.
///
/// Flags are derived once from the tags when the definition is created; the tags
/// themselves are kept for tagged lookups.
#[derive(Clone)]
pub struct Definition {
    key: String,
    factory: Factory,
    tags: Tags,
    shared: bool,
    private: bool,
    priority: i16,
    kind: Kind,
    alias_of: Option<Arc<Definition>>,
}

impl Definition {
    /// Validate `tags` and build the definition for `key`
    pub fn new(key: impl Into<String>, factory: Factory, tags: Tags) -> DIResult<Self> {
        let key = key.into();

        let shared = parse_bool_tag(&key, TAG_SHARED, &tags)?;
        let private = parse_bool_tag(&key, TAG_PRIVATE, &tags)?;
        let priority = parse_priority_tag(&key, TAG_PRIORITY, &tags)?;
        let kind = select_kind(&key, &tags)?;

        Ok(Self {
            key,
            factory,
            tags,
            shared,
            private,
            priority,
            kind,
            alias_of: None,
        })
    }

    pub(crate) fn aliasing(mut self, target: Arc<Definition>) -> Self {
        self.alias_of = Some(target);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn priority(&self) -> i16 {
        self.priority
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The definition this alias mirrors, if it is one
    pub fn alias_of(&self) -> Option<&Arc<Definition>> {
        self.alias_of.as_ref()
    }

    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Tag value, or `default` when the tag is absent
    pub fn tag_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.tag(name).unwrap_or(default)
    }

    pub(crate) fn build(&self, container: &dyn Container) -> DIResult<Instance> {
        (self.factory)(container)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("key", &self.key)
            .field("tags", &self.tags)
            .field("shared", &self.shared)
            .field("private", &self.private)
            .field("priority", &self.priority)
            .field("kind", &self.kind)
            .field("alias_of", &self.alias_of.as_ref().map(|d| d.key()))
            .finish()
    }
}

/// Read a boolean tag. Presence with an empty value means `true`.
pub fn parse_bool_tag(key: &str, tag: &str, tags: &Tags) -> DIResult<bool> {
    match tags.get(tag).map(String::as_str) {
        None => Ok(false),
        Some("" | "true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(other) => Err(invalid_tag(key, tag, other, "boolean")),
    }
}

/// Read a signed 16-bit tag, defaulting to 0 when absent or empty
pub fn parse_priority_tag(key: &str, tag: &str, tags: &Tags) -> DIResult<i16> {
    match tags.get(tag).map(String::as_str) {
        None | Some("") => Ok(0),
        Some(raw) => raw
            .parse::<i16>()
            .map_err(|_| invalid_tag(key, tag, raw, "number")),
    }
}

/// The kind declared by the tags, or `None` if no kind tag is present
pub fn declared_kind(key: &str, tags: &Tags) -> DIResult<Option<Kind>> {
    let mut found: Option<Kind> = None;

    for tag in KIND_TAGS {
        if !tags.contains_key(tag) {
            continue;
        }
        if found.is_some() {
            return Err(DIError::ConflictingKinds {
                key: key.to_string(),
                tag: tag.to_string(),
            });
        }
        found = Kind::from_tag(tag);
    }

    Ok(found)
}

/// Like [`declared_kind`], defaulting to [`Kind::Factory`]
pub fn select_kind(key: &str, tags: &Tags) -> DIResult<Kind> {
    Ok(declared_kind(key, tags)?.unwrap_or(Kind::Factory))
}

/// Merge tag sets. On conflict the set that comes first wins.
pub fn merge_tags<'a>(sets: impl IntoIterator<Item = &'a Tags>) -> Tags {
    let mut merged = Tags::new();
    for set in sets {
        for (name, value) in set {
            merged
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
    merged
}

/// Factory that hands out the same instance on every call
pub(crate) fn constant(instance: Instance) -> Factory {
    Arc::new(move |_: &dyn Container| -> DIResult<Instance> { Ok(Arc::clone(&instance)) })
}

/// Erase a typed factory into the canonical signature
pub(crate) fn erase<F, T>(factory: F) -> Factory
where
    F: Fn(&dyn Container) -> DIResult<Arc<T>> + Send + Sync + 'static,
    T: Any + Send + Sync,
{
    Arc::new(move |container: &dyn Container| -> DIResult<Instance> {
        let instance: Instance = factory(container)?;
        Ok(instance)
    })
}

fn invalid_tag(key: &str, tag: &str, value: &str, expected: &'static str) -> DIError {
    DIError::InvalidTagValue {
        key: key.to_string(),
        tag: tag.to_string(),
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn dummy() -> Factory {
        constant(Arc::new(1_i32))
    }

    #[test]
    fn test_parse_bool_tag() {
        let cases = [
            (tags(&[("tag", "")]), true),
            (tags(&[("tag", "true")]), true),
            (tags(&[("tag", "1")]), true),
            (tags(&[("tag", "false")]), false),
            (tags(&[("tag", "0")]), false),
            (tags(&[]), false),
        ];
        for (set, expected) in cases {
            assert_eq!(parse_bool_tag("k", "tag", &set).unwrap(), expected, "{set:?}");
        }

        let err = parse_bool_tag("k", "tag", &tags(&[("tag", "dummy")])).unwrap_err();
        assert!(matches!(err, DIError::InvalidTagValue { ref value, .. } if value == "dummy"));
    }

    #[test]
    fn test_parse_priority_tag() {
        let cases = [
            (tags(&[]), 0),
            (tags(&[("tag", "")]), 0),
            (tags(&[("tag", "0")]), 0),
            (tags(&[("tag", "1")]), 1),
            (tags(&[("tag", "-1")]), -1),
            (tags(&[("tag", "32767")]), i16::MAX),
        ];
        for (set, expected) in cases {
            assert_eq!(parse_priority_tag("k", "tag", &set).unwrap(), expected);
        }

        assert!(parse_priority_tag("k", "tag", &tags(&[("tag", "dummy")])).is_err());
        assert!(parse_priority_tag("k", "tag", &tags(&[("tag", "40000")])).is_err());
    }

    #[test]
    fn test_select_kind() {
        for tag in KIND_TAGS {
            let set = tags(&[("tag1", ""), (tag, ""), ("tag2", "")]);
            assert_eq!(select_kind("k", &set).unwrap().as_tag(), tag);
        }

        assert_eq!(select_kind("k", &tags(&[("tag1", "")])).unwrap(), Kind::Factory);

        let err = select_kind("k", &tags(&[(TAG_FACTORY, ""), (TAG_VALUE, "")])).unwrap_err();
        assert!(matches!(err, DIError::ConflictingKinds { ref tag, .. } if tag == TAG_VALUE));
    }

    #[test]
    fn test_merge_tags_keeps_former() {
        let a = tags(&[("tag1", "preserved")]);
        let b = tags(&[("tag2", ""), ("tag1", "lost")]);
        let c = tags(&[("tag3", "any")]);

        let merged = merge_tags([&a, &b, &c]);
        assert_eq!(
            merged,
            tags(&[("tag1", "preserved"), ("tag2", ""), ("tag3", "any")])
        );
    }

    #[test]
    fn test_new_definition_defaults() {
        let def = Definition::new("k", dummy(), Tags::new()).unwrap();
        assert!(!def.is_shared());
        assert!(!def.is_private());
        assert_eq!(def.priority(), 0);
        assert_eq!(def.kind(), Kind::Factory);
        assert!(def.tags().is_empty());
        assert!(def.alias_of().is_none());
    }

    #[test]
    fn test_new_definition_with_tags() {
        let custom = tags(&[
            (TAG_VALUE, ""),
            (TAG_PRIVATE, ""),
            (TAG_SHARED, "1"),
            (TAG_PRIORITY, "9"),
        ]);
        let def = Definition::new("k", dummy(), custom.clone()).unwrap();

        assert!(def.is_shared());
        assert!(def.is_private());
        assert_eq!(def.priority(), 9);
        assert_eq!(def.kind(), Kind::Value);
        assert_eq!(def.tags(), &custom);
    }

    #[test]
    fn test_new_definition_errors() {
        let cases = [
            (
                tags(&[(TAG_PRIORITY, "abc")]),
                "priority tag value 'abc' is not a valid number (definition 'k')",
            ),
            (
                tags(&[(TAG_PRIVATE, "off")]),
                "private tag value 'off' is not a valid boolean (definition 'k')",
            ),
            (
                tags(&[(TAG_SHARED, "on")]),
                "shared tag value 'on' is not a valid boolean (definition 'k')",
            ),
        ];

        for (set, message) in cases {
            let err = Definition::new("k", dummy(), set).unwrap_err();
            assert_eq!(err.to_string(), message);
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn test_tag_accessors() {
        let def = Definition::new("k", dummy(), tags(&[("exists", "abc")])).unwrap();

        assert!(def.has_tag("exists"));
        assert!(!def.has_tag("not-exists"));
        assert_eq!(def.tag("exists"), Some("abc"));
        assert_eq!(def.tag("not-exists"), None);
        assert_eq!(def.tag_or("not-exists", "alternative"), "alternative");
        assert_eq!(def.tag_or("exists", "alternative"), "abc");
    }
}
