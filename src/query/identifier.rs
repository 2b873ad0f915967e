use serde::{Serialize, Serializer};
use std::fmt;
use crate::{Error, Result, MAX_IDENTIFIER_LEN};

/// A table or column name that is safe to splice into query text.
///
/// Names arriving from requests must come through [`Identifier::parse`], which only
/// admits `[A-Za-z0-9_]`. Names read back from the store catalog use
/// [`Identifier::from_catalog`]; they are never user-controlled and are quoted
/// with backtick doubling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw.len() > MAX_IDENTIFIER_LEN {
            return Err(Error::InvalidIdentifier(raw.to_string()));
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn from_catalog(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn quoted(&self) -> String {
        format!("`{}`", self.0.replace('`', "``"))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
