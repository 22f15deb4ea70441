//! Namespaced resource identifiers: `namespace:path`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace used when an identifier omits one.
pub const DEFAULT_NAMESPACE: &str = "respak";

/// Separator between namespace and path.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Errors from parsing a [`ResourceId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("identifier path is empty")]
    EmptyPath,

    #[error("invalid character {ch:?} in namespace {namespace:?}")]
    InvalidNamespace { namespace: String, ch: char },

    #[error("invalid character {ch:?} in path {path:?}")]
    InvalidPath { path: String, ch: char },

    #[error("identifier {0:?} has more than one ':'")]
    TooManySeparators(String),
}

/// A namespaced identifier such as `respak:lang/en_us`.
///
/// Namespaces use `[a-z0-9._-]`; paths use `[a-z0-9./_-]` and may not be
/// empty. An empty namespace (`":path"`) is the default namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId {
    namespace: String,
    path: String,
}

impl ResourceId {
    /// Build an identifier from parts, validating both.
    pub fn new(namespace: &str, path: &str) -> Result<Self, IdentifierError> {
        let namespace = if namespace.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            namespace
        };
        if let Some(ch) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(IdentifierError::InvalidNamespace {
                namespace: namespace.to_string(),
                ch,
            });
        }
        if path.is_empty() {
            return Err(IdentifierError::EmptyPath);
        }
        if let Some(ch) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(IdentifierError::InvalidPath {
                path: path.to_string(),
                ch,
            });
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// An identifier in the default namespace.
    pub fn with_default_namespace(path: &str) -> Result<Self, IdentifierError> {
        Self::new(DEFAULT_NAMESPACE, path)
    }

    /// Parse `namespace:path` or a bare `path`.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let mut parts = s.split(NAMESPACE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(path), None, _) => Self::new(DEFAULT_NAMESPACE, path),
            (Some(namespace), Some(path), None) => Self::new(namespace, path),
            _ => Err(IdentifierError::TooManySeparators(s.to_string())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl FromStr for ResourceId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{NAMESPACE_SEPARATOR}{}", self.namespace, self.path)
    }
}
