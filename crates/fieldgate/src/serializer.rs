//! Serialization with a fixed schema and caller-side hooks.
//!
//! [`Serializer`] bundles a compiled schema with the options a model layer
//! needs when it turns documents into output:
//!
//! - **Virtual fields**: computed fields that appear in a document's serialized
//!   form but not in its declared schema get their own default access.
//! - **Dry run**: leave output untouched while still reporting what would have
//!   been filtered, useful for rolling out a schema.
//! - **Audit hook**: receives the (before, after) pair of every serialization.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::filter::{filter, FilterOptions};
use crate::schema::{AccessTag, FilterSchema, SchemaNode};
use crate::view::{wrap, Document, View};

/// Receives every (before, after) pair produced by a [`Serializer`].
pub trait AuditHook: Send + Sync {
    /// Called once per serialized document.
    fn on_serialize(&self, before: &Value, after: &Value);
}

impl<F> AuditHook for F
where
    F: Fn(&Value, &Value) + Send + Sync,
{
    fn on_serialize(&self, before: &Value, after: &Value) {
        self(before, after);
    }
}

/// An audit hook that logs the top-level fields a serialization dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditHook for TracingAudit {
    fn on_serialize(&self, before: &Value, after: &Value) {
        let (Some(before), Some(after)) = (before.as_object(), after.as_object()) else {
            return;
        };
        let dropped: Vec<&str> = before
            .keys()
            .filter(|key| !after.contains_key(*key))
            .map(String::as_str)
            .collect();
        debug!(kept = after.len(), dropped = ?dropped, "Serialized document");
    }
}

/// Options that only matter when serializing whole documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Access for virtual fields present in a document.
    pub default_virtuals_access: AccessTag,
    /// Report through the audit hook but return documents unfiltered.
    pub dry_run: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            default_virtuals_access: AccessTag::Private,
            dry_run: false,
        }
    }
}

/// A schema plus the policy for applying it to whole documents.
pub struct Serializer {
    schema: SchemaNode,
    filter_options: FilterOptions,
    options: SerializerOptions,
    virtuals: BTreeSet<String>,
    audit: Option<Box<dyn AuditHook>>,
}

impl Serializer {
    /// Create a serializer for `schema`.
    #[must_use]
    pub fn new(
        schema: impl Into<SchemaNode>,
        filter_options: FilterOptions,
        options: SerializerOptions,
    ) -> Self {
        Self {
            schema: schema.into(),
            filter_options,
            options,
            virtuals: BTreeSet::new(),
            audit: None,
        }
    }

    /// Declare the names of virtual (computed) fields.
    #[must_use]
    pub fn with_virtuals<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.virtuals.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Install an audit hook.
    #[must_use]
    pub fn with_audit_hook(mut self, hook: impl AuditHook + 'static) -> Self {
        self.audit = Some(Box::new(hook));
        self
    }

    /// The schema this serializer applies.
    #[must_use]
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Access applied to fields the schema does not mention.
    #[must_use]
    pub fn default_access(&self) -> AccessTag {
        self.filter_options.default_fields_access
    }

    /// Check if dry-run mode is on.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// Serialize one document.
    #[must_use]
    pub fn serialize(&self, document: &Value) -> Value {
        if self.options.dry_run {
            trace!("Dry run; document returned unfiltered");
            self.audit(document, document);
            return document.clone();
        }
        let schema = self.effective_schema(document);
        let filtered = filter(document, &schema, self.default_access());
        self.audit(document, &filtered);
        filtered
    }

    /// Serialize a batch of documents.
    #[must_use]
    pub fn serialize_many(&self, documents: &[Value]) -> Vec<Value> {
        documents.iter().map(|doc| self.serialize(doc)).collect()
    }

    /// Wrap a document in a view bound to this serializer's schema.
    #[must_use]
    pub fn view<'a, D: Document + ?Sized>(&'a self, document: &'a D) -> View<'a, D> {
        wrap(document, &self.schema, self.default_access())
    }

    /// The schema with virtual fields present in `document` overlaid.
    fn effective_schema(&self, document: &Value) -> Cow<'_, SchemaNode> {
        let (SchemaNode::Tree(tree), Some(record)) = (&self.schema, document.as_object()) else {
            return Cow::Borrowed(&self.schema);
        };
        let present: FilterSchema = self
            .virtuals
            .iter()
            .filter(|key| record.contains_key(key.as_str()))
            .map(|key| (key.as_str(), self.options.default_virtuals_access))
            .collect();
        if present.is_empty() {
            return Cow::Borrowed(&self.schema);
        }
        let mut merged = tree.clone();
        merged.overlay(present);
        Cow::Owned(SchemaNode::Tree(merged))
    }

    fn audit(&self, before: &Value, after: &Value) {
        if let Some(hook) = &self.audit {
            hook.on_serialize(before, after);
        }
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("schema", &self.schema)
            .field("filter_options", &self.filter_options)
            .field("options", &self.options)
            .field("virtuals", &self.virtuals)
            .field("audit", &self.audit.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    use crate::schema::{compile, CompileOptions, FieldSpec};

    fn user_serializer(options: SerializerOptions) -> Serializer {
        let fields = vec![
            FieldSpec::new("name").with_access(AccessTag::Public),
            FieldSpec::new("email").with_access(AccessTag::Public),
            FieldSpec::new("password").with_access(AccessTag::Private),
            FieldSpec::auto("_id"),
        ];
        let schema = compile(&fields, &CompileOptions::default());
        Serializer::new(schema, FilterOptions::default(), options)
    }

    fn joe() -> Value {
        json!({
            "_id": "64b0",
            "__v": 0,
            "name": "Joe",
            "email": "joe@example.com",
            "password": "secret"
        })
    }

    #[test]
    fn test_serialize_filters() {
        let serializer = user_serializer(SerializerOptions::default());
        assert_eq!(
            serializer.serialize(&joe()),
            json!({"name": "Joe", "email": "joe@example.com"})
        );
    }

    #[test]
    fn test_virtuals_private_by_default() {
        let serializer = user_serializer(Default::default()).with_virtuals(["fullName"]);
        let mut doc = joe();
        doc["fullName"] = json!("Joe Bloggs");
        let out = serializer.serialize(&doc);
        assert!(out.get("fullName").is_none());
    }

    #[test]
    fn test_virtuals_public() {
        let options = SerializerOptions {
            default_virtuals_access: AccessTag::Public,
            ..Default::default()
        };
        let serializer = user_serializer(options).with_virtuals(["fullName", "age"]);
        let mut doc = joe();
        doc["fullName"] = json!("Joe Bloggs");
        let out = serializer.serialize(&doc);
        assert_eq!(out["fullName"], json!("Joe Bloggs"));
        assert!(out.get("age").is_none());
    }

    #[test]
    fn test_virtual_overrides_schema_entry() {
        let options = SerializerOptions {
            default_virtuals_access: AccessTag::Public,
            ..Default::default()
        };
        let serializer = user_serializer(options).with_virtuals(["password"]);
        assert_eq!(serializer.serialize(&joe())["password"], json!("secret"));
    }

    #[test]
    fn test_dry_run_returns_input_and_audits_pair() {
        let seen: Arc<Mutex<Vec<(Value, Value)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let options = SerializerOptions {
            dry_run: true,
            ..Default::default()
        };
        let hook = move |before: &Value, after: &Value| {
            sink.lock().unwrap().push((before.clone(), after.clone()));
        };
        let serializer = user_serializer(options).with_audit_hook(hook);

        assert!(serializer.is_dry_run());
        assert_eq!(serializer.serialize(&joe()), joe());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, seen[0].1);
    }

    #[test]
    fn test_audit_hook_sees_before_and_after() {
        let seen: Arc<Mutex<Vec<(Value, Value)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let hook = move |before: &Value, after: &Value| {
            sink.lock().unwrap().push((before.clone(), after.clone()));
        };
        let serializer = user_serializer(Default::default()).with_audit_hook(hook);

        let out = serializer.serialize(&joe());
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, joe());
        assert_eq!(seen[0].1, out);
    }

    #[test]
    fn test_tracing_audit_does_not_panic() {
        crate::logging::init_test_logging();
        let serializer = user_serializer(Default::default()).with_audit_hook(TracingAudit);
        let _ = serializer.serialize(&joe());
        let _ = serializer.serialize(&json!("not an object"));
    }

    #[test]
    fn test_serialize_many() {
        let serializer = user_serializer(SerializerOptions::default());
        let batch = [joe(), json!({"name": "Ann", "password": "x"})];
        let out = serializer.serialize_many(&batch);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], json!({"name": "Ann"}));
    }

    #[test]
    fn test_view_uses_serializer_schema() {
        let serializer = user_serializer(SerializerOptions::default());
        let doc = json!({"name": "Joe", "profile": {"a": 1}});
        let view = serializer.view(&doc);
        assert_eq!(view.to_json(), json!({"name": "Joe"}));
        assert_eq!(view.get("profile").unwrap().to_json(), json!({}));
    }

    #[test]
    fn test_tag_schema_ignores_virtuals() {
        let serializer = Serializer::new(
            AccessTag::Public,
            FilterOptions::default(),
            SerializerOptions::default(),
        )
        .with_virtuals(["x"]);
        let doc = json!({"x": 1, "y": 2});
        assert_eq!(serializer.serialize(&doc), doc);
    }

    #[test]
    fn test_debug_hides_hook() {
        let serializer = user_serializer(Default::default()).with_audit_hook(TracingAudit);
        let debug_str = format!("{serializer:?}");
        assert!(debug_str.contains("Serializer"));
        assert!(debug_str.contains("audit: true"));
    }
}
