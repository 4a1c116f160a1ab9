//! Lazy filtered views over records.
//!
//! A [`View`] wraps a record so that ordinary reads see everything, while
//! serializing the view (or any nested view reached through it) yields only
//! what the schema allows at that position.
//!
//! Views never compute their schema node when they are created. Each view
//! stores the schema node it was anchored at together with the [`KeyPath`]
//! walked since then, and resolves the governing node only when it is
//! serialized. A nested view taken out of its parent therefore still filters
//! as if it had been serialized in place.
//!
//! ```
//! use fieldgate::schema::{AccessTag, SchemaNode};
//! use fieldgate::view::wrap;
//! use serde_json::json;
//!
//! let record = json!({"a": {"b": "x", "c": "y"}});
//! let schema = SchemaNode::from_value(&json!({"a": {"b": "public", "c": "private"}})).unwrap();
//!
//! let view = wrap(&record, &schema, AccessTag::Private);
//! let a = view.get("a").unwrap();
//!
//! // Reads are transparent...
//! assert_eq!(a.raw()["c"], json!("y"));
//! // ...serialization is filtered.
//! assert_eq!(serde_json::to_value(&a).unwrap(), json!({"b": "x"}));
//! ```
//!
//! Views borrow the record, so it cannot change underneath a live view. Each
//! serialization reads the record as it is at that moment; nothing is cached.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::filter::{filter, FilterOptions};
use crate::schema::{AccessTag, KeyPath, SchemaNode};

/// A record that can be read field by field and has a natural serialized
/// form.
///
/// For plain JSON the natural form is the value itself. Host types that
/// serialize differently (adding computed fields, renaming, hiding internal
/// state) return that form from [`to_document`](Document::to_document);
/// filtering is applied to it.
pub trait Document {
    /// Read a field of the live record.
    fn field(&self, key: &str) -> Option<&Value>;

    /// The form this record takes when serialized, before filtering.
    fn to_document(&self) -> Cow<'_, Value>;
}

impl Document for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|record| record.get(key))
    }

    fn to_document(&self) -> Cow<'_, Value> {
        Cow::Borrowed(self)
    }
}

impl Document for Map<String, Value> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn to_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::Object(self.clone()))
    }
}

/// Wrap a record in a lazily filtered view.
#[must_use]
pub fn wrap<'a, D: Document + ?Sized>(
    target: &'a D,
    schema: &'a SchemaNode,
    default_access: AccessTag,
) -> View<'a, D> {
    View::new(target, schema, default_access)
}

/// Wrap a record using [`FilterOptions`].
#[must_use]
pub fn wrap_with<'a, D: Document + ?Sized>(
    target: &'a D,
    schema: &'a SchemaNode,
    options: FilterOptions,
) -> View<'a, D> {
    View::new(target, schema, options.default_fields_access)
}

/// A read-transparent, serialize-filtered lens over a record.
pub struct View<'a, D: ?Sized = Value> {
    target: &'a D,
    anchor: &'a SchemaNode,
    path: KeyPath,
    default_access: AccessTag,
}

/// What reading a field through a [`View`] yields.
#[derive(Debug, Clone)]
pub enum Field<'a> {
    /// The field holds an object, wrapped in a nested view.
    View(View<'a, Value>),
    /// Any other value, handed out unwrapped and unfiltered.
    Value(&'a Value),
}

impl<'a, D: Document + ?Sized> View<'a, D> {
    /// Create a view anchored at `schema`.
    #[must_use]
    pub fn new(target: &'a D, schema: &'a SchemaNode, default_access: AccessTag) -> Self {
        Self {
            target,
            anchor: schema,
            path: KeyPath::root(),
            default_access,
        }
    }

    /// Read a field.
    ///
    /// Objects come back as nested views sharing this view's anchor, with the
    /// key appended to the path. Everything else (arrays included) comes back
    /// as the raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Field<'a>> {
        let value = self.target.field(key)?;
        Some(match value {
            Value::Object(_) => Field::View(View {
                target: value,
                anchor: self.anchor,
                path: self.path.child(key),
                default_access: self.default_access,
            }),
            other => Field::Value(other),
        })
    }

    /// Read a nested field by following `keys`.
    ///
    /// Returns `None` when a key is missing or a non-object is reached before
    /// the last key.
    #[must_use]
    pub fn get_path<I, S>(&self, keys: I) -> Option<Field<'a>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = keys.into_iter();
        let mut field = self.get(keys.next()?.as_ref())?;
        for key in keys {
            field = match field {
                Field::View(view) => view.get(key.as_ref())?,
                Field::Value(_) => return None,
            };
        }
        Some(field)
    }

    /// The wrapped record.
    #[must_use]
    pub fn target(&self) -> &'a D {
        self.target
    }

    /// The schema node this view was anchored at.
    #[must_use]
    pub fn anchor(&self) -> &'a SchemaNode {
        self.anchor
    }

    /// The path walked from the anchor to this view.
    #[must_use]
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Access applied to fields the schema does not mention.
    #[must_use]
    pub fn default_access(&self) -> AccessTag {
        self.default_access
    }

    /// Resolve the schema node governing this view's position.
    #[must_use]
    pub fn schema(&self) -> Cow<'a, SchemaNode> {
        self.anchor.resolve(&self.path, self.default_access)
    }

    /// Re-anchor this view at a schema node known to apply to it directly.
    ///
    /// The path is reset, so later resolution starts from `schema`.
    #[must_use]
    pub fn rebase(self, schema: &'a SchemaNode) -> Self {
        Self {
            anchor: schema,
            path: KeyPath::root(),
            ..self
        }
    }

    /// The filtered serialized form of this view.
    ///
    /// Takes the record's natural form and filters it with the node resolved
    /// for this position. Never touches the record.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let schema = self.schema();
        debug!(path = %self.path, "Serializing view");
        filter(&self.target.to_document(), &schema, self.default_access)
    }
}

impl<'a> View<'a, Value> {
    /// Iterate the fields of the wrapped object, reading each through the
    /// view. Non-object records have no fields.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, Field<'a>)> + '_ {
        self.target
            .as_object()
            .into_iter()
            .flat_map(|record| record.keys())
            .filter_map(move |key| self.get(key).map(|field| (key.as_str(), field)))
    }
}

impl<'a> Field<'a> {
    /// The live value behind this field, unfiltered.
    #[must_use]
    pub fn raw(&self) -> &'a Value {
        match self {
            Self::View(view) => view.target,
            Self::Value(value) => *value,
        }
    }

    /// The nested view, if the field holds an object.
    #[must_use]
    pub fn as_view(&self) -> Option<&View<'a, Value>> {
        match self {
            Self::View(view) => Some(view),
            Self::Value(_) => None,
        }
    }

    /// Take the nested view out of the field, if the field holds an object.
    #[must_use]
    pub fn into_view(self) -> Option<View<'a, Value>> {
        match self {
            Self::View(view) => Some(view),
            Self::Value(_) => None,
        }
    }

    /// The serialized form of this field: filtered for views, raw otherwise.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::View(view) => view.to_json(),
            Self::Value(value) => (*value).clone(),
        }
    }
}

impl<D: ?Sized> Clone for View<'_, D> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            anchor: self.anchor,
            path: self.path.clone(),
            default_access: self.default_access,
        }
    }
}

impl<D: ?Sized> fmt::Debug for View<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("path", &self.path)
            .field("anchor", &self.anchor)
            .field("default_access", &self.default_access)
            .finish_non_exhaustive()
    }
}

impl<D: Document + ?Sized> Serialize for View<'_, D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Field<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::View(view) => view.serialize(serializer),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}
