//! Filter schemas.
//!
//! A filter schema mirrors (a sparse subset of) a record's shape and says, per
//! field, whether the field is serialized:
//!
//! - **Tags**: `"public"` keeps a field as-is, `"private"` drops it. A tag on
//!   a field holding a nested object applies to the whole subtree.
//! - **Trees**: a nested mapping means "decide field by field below here".
//! - **Gaps**: fields the schema does not mention fall back to a default
//!   access policy, `private` unless configured otherwise.
//!
//! # Example
//!
//! ```
//! use fieldgate::schema::{AccessTag, SchemaNode};
//! use serde_json::json;
//!
//! let schema = SchemaNode::from_value(&json!({
//!     "name": "public",
//!     "profile": {"bio": "public", "phone": "private"}
//! }))
//! .unwrap();
//!
//! let node = schema.resolve(["profile", "phone"], AccessTag::Public);
//! assert_eq!(node.as_tag(), Some(AccessTag::Private));
//! ```

mod access;
mod compile;
mod node;
mod path;

pub use access::AccessTag;
pub use compile::{compile, CompileOptions, FieldSpec, DEFAULT_VERSION_KEY};
pub use node::{FilterSchema, SchemaNode};
pub use path::KeyPath;
