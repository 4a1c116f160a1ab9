//! The filter engine.
//!
//! Given a record, a schema node, and a default access policy, produce a fresh
//! record holding only the fields the schema lets through. The input is never
//! modified.
//!
//! The walk is driven by the *data's* keys rather than the schema's, since the
//! schema may be sparse. For each key exactly one rule applies:
//!
//! | schema entry | data value        | result                         |
//! |--------------|-------------------|--------------------------------|
//! | tree         | object            | recurse                        |
//! | tree         | array             | recurse into object elements   |
//! | tree         | scalar            | omit                           |
//! | `public`     | anything          | copy verbatim                  |
//! | `private`    | anything          | omit                           |
//! | none         | anything          | apply the default policy       |

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::schema::{AccessTag, FilterSchema, SchemaNode};

/// Options shared by [`filter`] and [`wrap`](crate::view::wrap).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Access applied to fields the schema has no entry for.
    pub default_fields_access: AccessTag,
}

impl FilterOptions {
    /// Options with the given default access.
    #[must_use]
    pub fn new(default_fields_access: AccessTag) -> Self {
        Self {
            default_fields_access,
        }
    }

    /// Fill unset options from the defaults.
    #[must_use]
    pub fn merge_with_default(default_fields_access: Option<AccessTag>) -> Self {
        Self::new(default_fields_access.unwrap_or_default())
    }
}

/// Filter `target` against `schema`, returning an owned copy.
///
/// A `public` tag returns the target as-is, a `private` tag returns an empty
/// object. Non-object targets are returned unchanged whatever the schema says.
#[must_use]
pub fn filter(target: &Value, schema: &SchemaNode, default_access: AccessTag) -> Value {
    filter_cow(target, schema, default_access).into_owned()
}

/// Like [`filter`], but borrows the target when nothing needs to change.
#[must_use]
pub fn filter_cow<'a>(
    target: &'a Value,
    schema: &SchemaNode,
    default_access: AccessTag,
) -> Cow<'a, Value> {
    let Value::Object(record) = target else {
        trace!("Non-object target passed through unfiltered");
        return Cow::Borrowed(target);
    };
    match schema {
        SchemaNode::Tag(AccessTag::Public) => Cow::Borrowed(target),
        SchemaNode::Tag(AccessTag::Private) => Cow::Owned(Value::Object(Map::new())),
        SchemaNode::Tree(tree) => {
            Cow::Owned(Value::Object(filter_record(record, tree, default_access)))
        }
    }
}

/// Filter a single record against a schema tree.
#[must_use]
pub fn filter_record(
    record: &Map<String, Value>,
    schema: &FilterSchema,
    default_access: AccessTag,
) -> Map<String, Value> {
    let mut output = Map::new();
    for (key, value) in record {
        let kept = match schema.get(key) {
            Some(SchemaNode::Tree(child)) => filter_nested(value, child, default_access),
            Some(SchemaNode::Tag(tag)) => tag.is_public().then(|| value.clone()),
            None => default_access.is_public().then(|| value.clone()),
        };
        match kept {
            Some(value) => {
                output.insert(key.clone(), value);
            }
            None => trace!(key = %key, "Field omitted"),
        }
    }
    output
}

fn filter_nested(value: &Value, schema: &FilterSchema, default: AccessTag) -> Option<Value> {
    match value {
        Value::Object(map) => Some(Value::Object(filter_record(map, schema, default))),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| Value::Object(filter_record(map, schema, default)))
                .collect(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> SchemaNode {
        SchemaNode::from_value(&value).unwrap()
    }

    fn joe() -> Value {
        json!({"name": "Joe", "email": "joe@x.com", "password": "secret"})
    }

    #[test]
    fn test_private_field_with_public_default() {
        let result = filter(
            &joe(),
            &schema(json!({"password": "private"})),
            AccessTag::Public,
        );
        assert_eq!(result, json!({"name": "Joe", "email": "joe@x.com"}));
    }

    #[test]
    fn test_empty_schema_private_default() {
        let result = filter(&joe(), &schema(json!({})), AccessTag::Private);
        assert_eq!(result, json!({}));
    }

    #[test]
    fn test_empty_schema_public_default() {
        let result = filter(&joe(), &schema(json!({})), AccessTag::Public);
        assert_eq!(result, joe());
    }

    #[test]
    fn test_nested_tree() {
        let record = json!({"a": {"b": "x", "c": "y"}});
        let result = filter(
            &record,
            &schema(json!({"a": {"b": "public", "c": "private"}})),
            AccessTag::Private,
        );
        assert_eq!(result, json!({"a": {"b": "x"}}));
    }

    #[test]
    fn test_top_level_tags() {
        let record = joe();
        assert_eq!(
            filter(&record, &SchemaNode::PUBLIC, AccessTag::Private),
            record
        );
        assert_eq!(
            filter(&record, &SchemaNode::PRIVATE, AccessTag::Public),
            json!({})
        );
    }

    #[test]
    fn test_public_tag_borrows() {
        let record = joe();
        let result = filter_cow(&record, &SchemaNode::PUBLIC, AccessTag::Private);
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_subtree_private_tag_omits_whole_object() {
        let record = json!({"name": "Joe", "settings": {"theme": "dark", "age": 12}});
        let result = filter(
            &record,
            &schema(json!({"settings": "private"})),
            AccessTag::Public,
        );
        assert_eq!(result, json!({"name": "Joe"}));
    }

    #[test]
    fn test_subtree_public_tag_ignores_deeper_rules() {
        let record = json!({"settings": {"theme": "dark", "token": "t0k"}});
        let result = filter(
            &record,
            &schema(json!({"settings": "public"})),
            AccessTag::Private,
        );
        assert_eq!(result, record);
    }

    #[test]
    fn test_default_fallback_per_key() {
        let record = json!({"listed": 1, "unlisted": 2});
        let rules = schema(json!({"listed": "public"}));
        assert_eq!(
            filter(&record, &rules, AccessTag::Private),
            json!({"listed": 1})
        );
        assert_eq!(filter(&record, &rules, AccessTag::Public), record);
    }

    #[test]
    fn test_default_applies_inside_nested_tree() {
        let record = json!({"profile": {"bio": "hi", "phone": "555"}});
        let rules = schema(json!({"profile": {"bio": "public"}}));
        assert_eq!(
            filter(&record, &rules, AccessTag::Private),
            json!({"profile": {"bio": "hi"}})
        );
        assert_eq!(filter(&record, &rules, AccessTag::Public), record);
    }

    #[test]
    fn test_tree_entry_over_scalar_is_omitted() {
        let record = json!({"profile": "not an object", "name": "Joe"});
        let rules = schema(json!({"profile": {"bio": "public"}, "name": "public"}));
        assert_eq!(
            filter(&record, &rules, AccessTag::Public),
            json!({"name": "Joe"})
        );
    }

    #[test]
    fn test_tree_entry_over_null_is_omitted() {
        let record = json!({"profile": null});
        let rules = schema(json!({"profile": {"bio": "public"}}));
        assert_eq!(filter(&record, &rules, AccessTag::Public), json!({}));
        assert_eq!(filter(&record, &rules, AccessTag::Private), json!({}));
    }

    #[test]
    fn test_tree_entry_over_array_filters_elements() {
        let record = json!({
            "addresses": [
                {"city": "Oslo", "street": "Main 1"},
                "stray",
                {"city": "Bergen"}
            ]
        });
        let rules = schema(json!({"addresses": {"city": "public"}}));
        assert_eq!(
            filter(&record, &rules, AccessTag::Private),
            json!({"addresses": [{"city": "Oslo"}, {"city": "Bergen"}]})
        );
    }

    #[test]
    fn test_non_object_target_unchanged() {
        let rules = schema(json!({"a": "private"}));
        assert_eq!(
            filter(&json!([1, 2]), &rules, AccessTag::Private),
            json!([1, 2])
        );
        assert_eq!(
            filter(&json!("s"), &SchemaNode::PRIVATE, AccessTag::Private),
            json!("s")
        );
        assert_eq!(
            filter(&Value::Null, &rules, AccessTag::Private),
            Value::Null
        );
    }

    #[test]
    fn test_malformed_entry_falls_back_to_default() {
        let rules = schema(json!({"password": "hidden"}));
        assert_eq!(filter(&joe(), &rules, AccessTag::Private), json!({}));
    }

    #[test]
    fn test_target_not_mutated() {
        let record = json!({"a": {"b": 1, "c": 2}});
        let before = record.clone();
        let _ = filter(
            &record,
            &schema(json!({"a": {"b": "public"}})),
            AccessTag::Private,
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_idempotent() {
        let record = json!({
            "name": "Joe",
            "password": "secret",
            "profile": {"bio": "hi", "phone": "555", "links": {"web": "x", "im": "y"}},
            "tags": ["a", "b"]
        });
        let rules = schema(json!({
            "name": "public",
            "profile": {"bio": "public", "links": {"web": "public"}},
            "tags": "public"
        }));
        for default in [AccessTag::Public, AccessTag::Private] {
            let once = filter(&record, &rules, default);
            let twice = filter(&once, &rules, default);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_kept_values_are_unaltered() {
        let record = json!({"a": 1, "b": {"c": [1, 2, 3]}, "d": null});
        let rules = schema(json!({"a": "public", "b": "public"}));
        let result = filter(&record, &rules, AccessTag::Private);
        let output = result.as_object().unwrap();
        for (key, value) in output {
            assert_eq!(&record[key], value);
        }
        assert!(!output.contains_key("d"));
    }

    #[test]
    fn test_merge_with_default() {
        assert_eq!(
            FilterOptions::merge_with_default(None).default_fields_access,
            AccessTag::Private
        );
        assert_eq!(
            FilterOptions::merge_with_default(Some(AccessTag::Public)).default_fields_access,
            AccessTag::Public
        );
    }
}
