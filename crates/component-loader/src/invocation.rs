//! Cross-boundary invocation
//!
//! Code outside the component graph (inline handlers, other frameworks) can
//! only reach an instance through its key. A [`MethodPath`] is the string
//! form such callers embed:
//!
//! ```text
//! ComponentLoader.findInstanceById('Header-3f2a...').toggle
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::LoaderError;

const PREFIX: &str = "ComponentLoader.findInstanceById('";
const SEPARATOR: &str = "').";

/// Instance key plus the method to call on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodPath {
    key: String,
    method: String,
}

impl MethodPath {
    pub fn new(key: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            method: method.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Parse the string produced by `Display`.
    pub fn parse(path: &str) -> Result<Self, LoaderError> {
        let invalid = || LoaderError::InvalidMethodPath(path.to_string());

        let rest = path.trim().strip_prefix(PREFIX).ok_or_else(invalid)?;
        let (key, method) = rest.rsplit_once(SEPARATOR).ok_or_else(invalid)?;

        if key.is_empty() || !is_identifier(method) {
            return Err(invalid());
        }
        Ok(Self::new(key, method))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for MethodPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}{SEPARATOR}{}", self.key, self.method)
    }
}

impl FromStr for MethodPath {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
