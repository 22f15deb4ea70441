//! Ordered extension lists.

use std::fmt;
use std::str::FromStr;

use crate::{GlobError, LIST_SEPARATOR};

/// An ordered set of acceptable file extensions, e.g. `".png|.jpg"`.
///
/// Every stored extension starts with a dot. Entries are kept in the order
/// they were written so callers can try `name.png` before `name.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Parse a pipe-delimited extension list.
    ///
    /// Blank entries are dropped and a missing leading dot is added, so
    /// `"png| .jpg"` and `".png|.jpg"` are the same filter.
    pub fn parse(list: &str) -> Result<Self, GlobError> {
        let extensions: Vec<String> = list
            .split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|e| !e.is_empty() && *e != ".")
            .map(|e| {
                if e.starts_with('.') {
                    e.to_string()
                } else {
                    format!(".{e}")
                }
            })
            .collect();

        if extensions.is_empty() {
            return Err(GlobError::Empty(list.to_string()));
        }
        Ok(Self { extensions })
    }

    /// Build a filter from a single extension.
    pub fn single(extension: &str) -> Result<Self, GlobError> {
        Self::parse(extension)
    }

    /// Extensions in lookup order, each with its leading dot.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Whether `file_name` ends with one of the extensions.
    ///
    /// A name that is only the extension (`".png"`) does not match.
    pub fn matches(&self, file_name: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| file_name.len() > ext.len() && file_name.ends_with(ext.as_str()))
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl FromStr for ExtensionFilter {
    type Err = GlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for ext in &self.extensions {
            if !first {
                write!(f, "{LIST_SEPARATOR}")?;
            }
            f.write_str(ext)?;
            first = false;
        }
        Ok(())
    }
}
