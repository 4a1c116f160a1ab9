//! Building filter schemas from model field metadata.
//!
//! A host model layer describes its fields as a flat list of dotted paths,
//! each optionally carrying a declared access level. Generated fields (such as
//! an `_id` primary key) are flagged `auto`. This module folds that list into
//! a nested [`FilterSchema`], filling gaps from [`CompileOptions`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::access::AccessTag;
use super::node::FilterSchema;
use super::path::KeyPath;

/// Default name of the document version field.
pub const DEFAULT_VERSION_KEY: &str = "__v";

/// Metadata for a single model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Dotted path of the field, e.g. `profile.address.city`.
    pub path: String,

    /// Declared access level, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessTag>,

    /// The field is generated by the model layer rather than declared.
    #[serde(default)]
    pub auto: bool,
}

impl FieldSpec {
    /// A declared field with no explicit access level.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            access: None,
            auto: false,
        }
    }

    /// A generated field such as `_id`.
    #[must_use]
    pub fn auto(path: impl Into<String>) -> Self {
        Self {
            auto: true,
            ..Self::new(path)
        }
    }

    /// Set the declared access level.
    #[must_use]
    pub fn with_access(mut self, access: AccessTag) -> Self {
        self.access = Some(access);
        self
    }
}

/// Access levels used when field metadata is silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Access for declared fields without an explicit level.
    pub default_schema_access: AccessTag,
    /// Access for generated fields.
    pub auto_field_access: AccessTag,
    /// Access for the version field.
    pub version_key_access: AccessTag,
    /// Name of the version field; `None` when the model is unversioned.
    pub version_key: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_schema_access: AccessTag::Private,
            auto_field_access: AccessTag::Private,
            version_key_access: AccessTag::Private,
            version_key: Some(DEFAULT_VERSION_KEY.to_string()),
        }
    }
}

/// Fold field metadata into a filter schema.
///
/// Later declarations of the exact same path win. Declarations sharing a
/// prefix are merged into one subtree.
#[must_use]
pub fn compile(fields: &[FieldSpec], options: &CompileOptions) -> FilterSchema {
    let mut schema = FilterSchema::new();

    if let Some(version_key) = options.version_key.as_deref().filter(|k| !k.is_empty()) {
        schema.insert(version_key, options.version_key_access);
    }

    for field in fields {
        let path = KeyPath::from_dotted(&field.path);
        if path.is_empty() {
            warn!(path = %field.path, "Skipping field with empty path");
            continue;
        }
        let access = if field.auto {
            options.auto_field_access
        } else {
            field.access.unwrap_or(options.default_schema_access)
        };
        schema.insert_path(&path, access);
    }

    debug!(
        fields = fields.len(),
        entries = schema.len(),
        "Compiled filter schema"
    );
    schema
}
