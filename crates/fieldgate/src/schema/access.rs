//! Access tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Whether a field appears in serialized output.
///
/// The wire spelling is exactly `"public"` or `"private"`; anything else is not
/// a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTag {
    /// Include the field, value copied as-is.
    Public,
    /// Omit the field entirely.
    #[default]
    Private,
}

impl AccessTag {
    /// Check if this tag lets the field through.
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    /// The wire spelling of this tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for AccessTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(Error::schema_parse(format!(
                "unknown access tag '{other}' (expected \"public\" or \"private\")"
            ))),
        }
    }
}
