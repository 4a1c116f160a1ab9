//! The recursive filter schema tree.

use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::access::AccessTag;
use super::path::KeyPath;

/// One position in a filter schema: either a verdict for the whole subtree,
/// or a tree of per-field entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    /// Include or omit everything at and below this position.
    Tag(AccessTag),
    /// Decide field by field.
    Tree(FilterSchema),
}

/// A sparse mapping from field name to [`SchemaNode`].
///
/// Fields the data has but the schema does not mention fall back to the
/// default access policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSchema {
    entries: BTreeMap<String, SchemaNode>,
}

impl SchemaNode {
    /// Shorthand for `Tag(Public)`.
    pub const PUBLIC: Self = Self::Tag(AccessTag::Public);
    /// Shorthand for `Tag(Private)`.
    pub const PRIVATE: Self = Self::Tag(AccessTag::Private);

    /// Interpret a JSON value as a schema node.
    ///
    /// Strings must be an exact tag spelling and objects become trees. Anything
    /// else (including a misspelled tag) is not a node and yields `None`; inside
    /// a tree such entries are dropped so the field falls back to the default
    /// access policy.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::parse_at(value, &KeyPath::root())
    }

    fn parse_at(value: &Value, path: &KeyPath) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::Tree(FilterSchema::parse_map(map, path))),
            Value::String(s) => match s.parse() {
                Ok(tag) => Some(Self::Tag(tag)),
                Err(_) => {
                    warn!(path = %path, tag = %s, "Ignoring unknown access tag");
                    None
                }
            },
            // unset
            Value::Null => None,
            other => {
                warn!(path = %path, value = %other, "Ignoring malformed schema entry");
                None
            }
        }
    }

    /// The tag, if this node is one.
    #[must_use]
    pub fn as_tag(&self) -> Option<AccessTag> {
        match self {
            Self::Tag(tag) => Some(*tag),
            Self::Tree(_) => None,
        }
    }

    /// The tree, if this node is one.
    #[must_use]
    pub fn as_tree(&self) -> Option<&FilterSchema> {
        match self {
            Self::Tag(_) => None,
            Self::Tree(tree) => Some(tree),
        }
    }

    /// Find the node that governs the position `path` below this one.
    ///
    /// Walking stops early in two cases. A tag governs its whole subtree, so
    /// reaching one returns it. A key the tree has no entry for is governed by
    /// `default_access`, which is returned as a tag.
    #[must_use]
    pub fn resolve<'a, I, S>(&'a self, path: I, default_access: AccessTag) -> Cow<'a, SchemaNode>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut node = self;
        for key in path {
            match node {
                Self::Tag(_) => break,
                Self::Tree(tree) => match tree.get(key.as_ref()) {
                    Some(child) => node = child,
                    None => return Cow::Owned(Self::Tag(default_access)),
                },
            }
        }
        Cow::Borrowed(node)
    }

    /// Convert back to the JSON shape this node was parsed from.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Tag(tag) => Value::String(tag.as_str().to_string()),
            Self::Tree(tree) => tree.to_value(),
        }
    }
}

impl From<AccessTag> for SchemaNode {
    fn from(tag: AccessTag) -> Self {
        Self::Tag(tag)
    }
}

impl From<FilterSchema> for SchemaNode {
    fn from(tree: FilterSchema) -> Self {
        Self::Tree(tree)
    }
}

impl FilterSchema {
    /// An empty schema; every field falls back to the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a JSON object as a schema, dropping malformed entries.
    ///
    /// Returns `None` when `value` is not an object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_object()
            .map(|map| Self::parse_map(map, &KeyPath::root()))
    }

    fn parse_map(map: &Map<String, Value>, path: &KeyPath) -> Self {
        let entries = map
            .iter()
            .filter_map(|(key, value)| {
                SchemaNode::parse_at(value, &path.child(key)).map(|node| (key.clone(), node))
            })
            .collect();
        Self { entries }
    }

    /// Look up the entry for a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.entries.get(key)
    }

    /// Set the entry for a field, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        node: impl Into<SchemaNode>,
    ) -> Option<SchemaNode> {
        self.entries.insert(key.into(), node.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.insert(key, node);
        self
    }

    /// Set the node at a nested path, creating intermediate trees.
    ///
    /// An intermediate position that currently holds a tag is replaced by a
    /// tree, since the deeper declaration is more specific. Sibling entries
    /// already present along the way are kept. An empty path is a no-op.
    pub fn insert_path(&mut self, path: &KeyPath, node: impl Into<SchemaNode>) {
        let Some((last, parents)) = path.segments().split_last() else {
            return;
        };
        let mut tree = self;
        for key in parents {
            let slot = tree
                .entries
                .entry(key.clone())
                .or_insert_with(|| SchemaNode::Tree(FilterSchema::new()));
            if let SchemaNode::Tag(_) = slot {
                *slot = SchemaNode::Tree(FilterSchema::new());
            }
            let SchemaNode::Tree(inner) = slot else {
                return;
            };
            tree = inner;
        }
        tree.entries.insert(last.clone(), node.into());
    }

    /// Shallow overlay: every top-level entry of `other` replaces the entry of
    /// the same name here.
    pub fn overlay(&mut self, other: FilterSchema) {
        self.entries.extend(other.entries);
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the schema mentions no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate top-level entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, SchemaNode> {
        self.entries.iter()
    }

    /// Convert back to a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, node)| (key.clone(), node.to_value()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a FilterSchema {
    type Item = (&'a String, &'a SchemaNode);
    type IntoIter = btree_map::Iter<'a, String, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, N: Into<SchemaNode>> FromIterator<(K, N)> for FilterSchema {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, node)| (key.into(), node.into()))
                .collect(),
        }
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Tag(tag) => tag.serialize(serializer),
            Self::Tree(tree) => tree.serialize(serializer),
        }
    }
}

impl Serialize for FilterSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| de::Error::custom("expected an access tag or a schema object"))
    }
}

impl<'de> Deserialize<'de> for FilterSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).ok_or_else(|| de::Error::custom("expected a schema object"))
    }
}
