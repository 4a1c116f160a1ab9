//! `fieldgate` - Field-level access control for serializing nested records
//!
//! This library decides which fields of a record appear when it is serialized,
//! while leaving in-process reads unrestricted. A filter schema marks fields
//! `public` or `private`; fields it does not mention follow a default policy.
//!
//! Two entry points:
//!
//! - [`filter`] computes a filtered copy when the governing schema node is
//!   known up front.
//! - [`wrap`] returns a [`View`] whose nested views carry enough context to
//!   filter correctly when serialized on their own, detached from the root.
//!
//! ```
//! use fieldgate::{filter, wrap, AccessTag, SchemaNode};
//! use serde_json::json;
//!
//! let user = json!({"name": "Joe", "email": "joe@x.com", "password": "secret"});
//! let schema = SchemaNode::from_value(&json!({"password": "private"})).unwrap();
//!
//! let public = filter(&user, &schema, AccessTag::Public);
//! assert_eq!(public, json!({"name": "Joe", "email": "joe@x.com"}));
//!
//! let view = wrap(&user, &schema, AccessTag::Public);
//! assert_eq!(view.get("password").unwrap().raw(), "secret");
//! assert_eq!(view.to_json(), public);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod schema;
pub mod serializer;
pub mod view;

pub use config::Config;
pub use error::{Error, Result};
pub use filter::{filter, filter_cow, FilterOptions};
pub use logging::init_logging;
pub use schema::{AccessTag, FilterSchema, KeyPath, SchemaNode};
pub use serializer::{AuditHook, Serializer, SerializerOptions, TracingAudit};
pub use view::{wrap, wrap_with, Document, Field, View};
